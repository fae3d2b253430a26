//! JSON output types for CLI responses.
//!
//! ## Conventions
//!
//! 1. **Status first:** every response starts with `status`
//! 2. **Versioned:** `schema_version` is carried on every response
//! 3. **Deterministic:** file arrays follow walk order, which is sorted

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{HeadstampError, OutputErrorCode};
use crate::inject::InjectReport;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// One rewritten (or would-be rewritten) file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path relative to the workspace root when possible.
    pub path: String,
    pub original_bytes: u64,
    pub new_bytes: u64,
}

/// Response for `headstamp inject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectResponse {
    pub status: String,
    pub schema_version: String,
    /// Test group that was targeted.
    pub group: String,
    pub dry_run: bool,
    pub files: Vec<FileInfo>,
    pub bytes_added: u64,
    /// Unified diff, dry runs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl InjectResponse {
    pub fn from_report(
        group: impl Into<String>,
        report: &InjectReport,
        display: impl Fn(&std::path::Path) -> String,
    ) -> Self {
        let files = report
            .files
            .iter()
            .map(|f| FileInfo {
                path: display(&f.path),
                original_bytes: f.original_bytes,
                new_bytes: f.new_bytes,
            })
            .collect();
        InjectResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            group: group.into(),
            dry_run: report.dry_run,
            files,
            bytes_added: report.bytes_added(),
            diff: report.diff.clone(),
        }
    }
}

/// Response for `headstamp list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub schema_version: String,
    pub group: String,
    pub dir: String,
    pub pattern: String,
    pub files: Vec<String>,
}

impl ListResponse {
    pub fn new(
        group: impl Into<String>,
        dir: impl Into<String>,
        pattern: impl Into<String>,
        files: Vec<String>,
    ) -> Self {
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            group: group.into(),
            dir: dir.into(),
            pattern: pattern.into(),
            files,
        }
    }
}

/// Error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, same as the exit status.
    pub code: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorInfo {
    pub fn from_error(err: &HeadstampError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            path: err.path().map(|p| p.display().to_string()),
        }
    }
}

/// Error response, written to stdout on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &HeadstampError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
