//! The header injector.
//!
//! Each target is read in full, the header is concatenated in front of the
//! original bytes, and the result overwrites the file. Files are processed
//! one at a time in set order. The first failure aborts the batch: files
//! already rewritten keep the header, later files are never opened.
//!
//! Running twice prepends the header twice.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, info_span};

use crate::diff::{generate_prepend_diff, PrependPreview};
use crate::error::{HeadstampError, HeadstampResult, IoOp};
use crate::filter::TargetSet;
use crate::header::Header;

/// Outcome of rewriting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedFile {
    pub path: PathBuf,
    /// Size before the rewrite.
    pub original_bytes: u64,
    /// Size after the rewrite.
    pub new_bytes: u64,
}

/// Outcome of a whole batch. Only built when every file succeeded.
#[derive(Debug, Clone, Default)]
pub struct InjectReport {
    pub files: Vec<InjectedFile>,
    pub dry_run: bool,
    /// Unified diff of the planned change, only for dry runs.
    pub diff: Option<String>,
}

impl InjectReport {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total bytes added across all files.
    pub fn bytes_added(&self) -> u64 {
        self.files
            .iter()
            .map(|f| f.new_bytes - f.original_bytes)
            .sum()
    }
}

/// Prepend `header` to a single file in place.
pub fn inject_file(path: &Path, header: &Header) -> HeadstampResult<InjectedFile> {
    let original = fs::read(path).map_err(|e| HeadstampError::from_io(e, path, IoOp::Read))?;
    let updated = header.prepend(&original);
    fs::write(path, &updated).map_err(|e| HeadstampError::from_io(e, path, IoOp::Write))?;

    Ok(InjectedFile {
        path: path.to_path_buf(),
        original_bytes: original.len() as u64,
        new_bytes: updated.len() as u64,
    })
}

/// Prepend `header` to every file in `targets`, stopping at the first error.
pub fn inject_all(targets: &TargetSet, header: &Header) -> HeadstampResult<InjectReport> {
    let _span = info_span!("inject", dir = %targets.dir().display(), files = targets.len()).entered();

    let mut files = Vec::with_capacity(targets.len());
    for path in targets.files() {
        let injected = inject_file(path, header)?;
        info!(
            path = %path.display(),
            bytes = injected.new_bytes,
            "prepended header"
        );
        files.push(injected);
    }

    Ok(InjectReport {
        files,
        dry_run: false,
        diff: None,
    })
}

/// Read every target and report what [`inject_all`] would do, writing nothing.
pub fn preview_all(targets: &TargetSet, header: &Header) -> HeadstampResult<InjectReport> {
    let mut files = Vec::with_capacity(targets.len());
    let mut previews = Vec::with_capacity(targets.len());
    let relative = targets.relative_paths();

    for (path, rel) in targets.files().iter().zip(relative) {
        let original = fs::read(path).map_err(|e| HeadstampError::from_io(e, path, IoOp::Read))?;
        let original_bytes = original.len() as u64;
        files.push(InjectedFile {
            path: path.clone(),
            original_bytes,
            new_bytes: original_bytes + header.len() as u64,
        });
        previews.push(PrependPreview::from_original(rel, &original));
    }

    Ok(InjectReport {
        diff: Some(generate_prepend_diff(header, &previews)),
        files,
        dry_run: true,
    })
}

// ============================================================================
// Tests
// ============================================================================
