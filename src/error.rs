//! Error types and exit code mapping for headstamp.
//!
//! `HeadstampError` is the single error type that every subsystem returns.
//! The binary renders it as an error JSON on stdout and exits with the code
//! from [`OutputErrorCode`].
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments (bad glob, bad config, bad flag combination)
//! - `3`: File not found (a matched path vanished before it was opened)
//! - `4`: Apply errors (permission denied, read/write failure)
//! - `10`: Internal errors

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric codes used for the process exit status and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad pattern, bad config).
    InvalidArguments = 2,
    /// A matched file could not be found when it was opened.
    FileNotFound = 3,
    /// Failed to read or write a target file.
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Which half of the read-modify-write cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
    Walk,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IoOp::Read => "read",
            IoOp::Write => "write",
            IoOp::Walk => "walk",
        };
        f.write_str(s)
    }
}

/// Unified error type for the library and the CLI.
#[derive(Debug, Error)]
pub enum HeadstampError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Config file missing or malformed.
    #[error("config error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// File vanished between enumeration and access.
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// File exists but cannot be opened for the requested operation.
    #[error("permission denied: cannot {op} {}", .path.display())]
    PermissionDenied { path: PathBuf, op: IoOp },

    /// Any other I/O failure.
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        op: IoOp,
        #[source]
        source: io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Result type for headstamp operations.
pub type HeadstampResult<T> = Result<T, HeadstampError>;

impl HeadstampError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        HeadstampError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        HeadstampError::InternalError {
            message: message.into(),
        }
    }

    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(err: io::Error, path: &Path, op: IoOp) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => HeadstampError::FileNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => HeadstampError::PermissionDenied {
                path: path.to_path_buf(),
                op,
            },
            _ => HeadstampError::Io {
                path: path.to_path_buf(),
                op,
                source: err,
            },
        }
    }

    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            HeadstampError::Config { path, .. }
            | HeadstampError::FileNotFound { path }
            | HeadstampError::PermissionDenied { path, .. }
            | HeadstampError::Io { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&HeadstampError> for OutputErrorCode {
    fn from(err: &HeadstampError) -> Self {
        match err {
            HeadstampError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            HeadstampError::InvalidPattern { .. } => OutputErrorCode::InvalidArguments,
            HeadstampError::Config { .. } => OutputErrorCode::InvalidArguments,
            HeadstampError::FileNotFound { .. } => OutputErrorCode::FileNotFound,
            HeadstampError::PermissionDenied { .. } => OutputErrorCode::ApplyError,
            HeadstampError::Io { .. } => OutputErrorCode::ApplyError,
            HeadstampError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
