//! Target file enumeration.
//!
//! A [`TargetSpec`] names a directory and a glob pattern. Collecting it walks
//! the directory and keeps every regular file whose path, relative to that
//! directory, matches the pattern.
//!
//! ## Semantics
//!
//! 1. Patterns use globset syntax: `*`, `**`, `?`, `[abc]`
//! 2. Patterns are matched against paths relative to the target directory
//! 3. Default exclusions (`.git`, `node_modules`, hidden directories) always apply
//! 4. A missing target directory yields an empty set
//! 5. The walk is sorted by file name, so the set order is deterministic

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{HeadstampError, HeadstampResult, IoOp};

/// Pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "**/*.test.ts";

/// Directory exclusions that always apply.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["**/.git/**", "**/node_modules/**"];

// ============================================================================
// Test Groups
// ============================================================================

/// The two groups of test files, each living in its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestGroup {
    Async,
    Sync,
}

impl TestGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestGroup::Async => "async",
            TestGroup::Sync => "sync",
        }
    }
}

impl fmt::Display for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Target Spec
// ============================================================================

/// Directory plus compiled glob pattern.
#[derive(Debug)]
pub struct TargetSpec {
    dir: PathBuf,
    pattern: String,
    matcher: GlobSet,
    exclusions: GlobSet,
}

impl TargetSpec {
    /// Compile `pattern` for matching under `dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use headstamp::filter::TargetSpec;
    ///
    /// let spec = TargetSpec::new("test/async", "**/*.test.ts").unwrap();
    /// assert!(spec.matches(std::path::Path::new("map.test.ts")));
    /// assert!(TargetSpec::new("test/async", "[oops").is_err());
    /// ```
    pub fn new(dir: impl Into<PathBuf>, pattern: &str) -> HeadstampResult<Self> {
        let matcher = build_glob_set(&[pattern])?;
        let exclusions = build_glob_set(DEFAULT_EXCLUSIONS)?;
        Ok(TargetSpec {
            dir: dir.into(),
            pattern: pattern.to_string(),
            matcher,
            exclusions,
        })
    }

    /// Target spec for one test group: `<test_root>/<group_dir>` with `pattern`.
    pub fn for_group(test_root: &Path, group_dir: &str, pattern: &str) -> HeadstampResult<Self> {
        TargetSpec::new(test_root.join(group_dir), pattern)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check a path relative to the target directory.
    pub fn matches(&self, rel_path: &Path) -> bool {
        if self.exclusions.is_match(rel_path) {
            return false;
        }
        self.matcher.is_match(rel_path)
    }

    /// Walk the target directory and collect matching files.
    pub fn collect(&self) -> HeadstampResult<TargetSet> {
        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "target directory does not exist");
            return Ok(TargetSet::empty(self.dir.clone()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(e, &self.dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel_path = match entry.path().strip_prefix(&self.dir) {
                Ok(p) => p,
                Err(_) => continue,
            };
            if self.matches(rel_path) {
                debug!(path = %entry.path().display(), "matched");
                files.push(entry.into_path());
            }
        }

        Ok(TargetSet {
            dir: self.dir.clone(),
            files,
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_error(err: walkdir::Error, dir: &Path) -> HeadstampError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
    match err.into_io_error() {
        Some(io_err) => HeadstampError::from_io(io_err, &path, IoOp::Walk),
        None => HeadstampError::internal(format!("filesystem loop at {}", path.display())),
    }
}

/// Build a GlobSet from a list of pattern strings.
fn build_glob_set<S: AsRef<str>>(patterns: &[S]) -> HeadstampResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| HeadstampError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| HeadstampError::InvalidPattern {
        pattern: "<combined>".to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Target Set
// ============================================================================

/// Files selected by a [`TargetSpec`], in walk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl TargetSet {
    fn empty(dir: PathBuf) -> Self {
        TargetSet {
            dir,
            files: Vec::new(),
        }
    }

    /// Build a set from explicit paths.
    pub fn from_paths(dir: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        TargetSet {
            dir: dir.into(),
            files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths relative to the target directory, as display strings.
    pub fn relative_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|p| {
                p.strip_prefix(&self.dir)
                    .unwrap_or(p)
                    .to_string_lossy()
                    .to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "describe()").unwrap();
    }

    fn create_test_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "test/async/map.test.ts");
        touch(root, "test/async/filter.test.ts");
        touch(root, "test/async/nested/zip.test.ts");
        touch(root, "test/async/helpers.ts");
        touch(root, "test/async/.cache/stale.test.ts");
        touch(root, "test/async/node_modules/dep/index.test.ts");
        touch(root, "test/sync/map.test.ts");
        dir
    }

    #[test]
    fn matches_pattern_relative_to_dir() {
        let spec = TargetSpec::new("test/async", DEFAULT_PATTERN).unwrap();
        assert!(spec.matches(Path::new("map.test.ts")));
        assert!(spec.matches(Path::new("nested/zip.test.ts")));
        assert!(!spec.matches(Path::new("helpers.ts")));
        assert!(!spec.matches(Path::new("node_modules/dep/index.test.ts")));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = TargetSpec::new("test", "[invalid").unwrap_err();
        assert!(matches!(err, HeadstampError::InvalidPattern { .. }));
    }

    #[test]
    fn collect_finds_group_files_sorted() {
        let tree = create_test_tree();
        let spec =
            TargetSpec::for_group(&tree.path().join("test"), "async", DEFAULT_PATTERN).unwrap();
        let set = spec.collect().unwrap();

        assert_eq!(
            set.relative_paths(),
            vec!["filter.test.ts", "map.test.ts", "nested/zip.test.ts"]
        );
    }

    #[test]
    fn collect_skips_hidden_and_vendor_dirs() {
        let tree = create_test_tree();
        let spec = TargetSpec::new(tree.path().join("test/async"), DEFAULT_PATTERN).unwrap();
        let set = spec.collect().unwrap();

        assert!(!set.relative_paths().iter().any(|p| p.contains(".cache")));
        assert!(!set.relative_paths().iter().any(|p| p.contains("node_modules")));
    }

    #[test]
    fn collect_stays_inside_group_dir() {
        let tree = create_test_tree();
        let spec = TargetSpec::for_group(&tree.path().join("test"), "sync", "*.test.ts").unwrap();
        let set = spec.collect().unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.files()[0], tree.path().join("test/sync/map.test.ts"));
    }

    #[test]
    fn collect_missing_dir_is_empty() {
        let tree = TempDir::new().unwrap();
        let spec = TargetSpec::new(tree.path().join("nope"), DEFAULT_PATTERN).unwrap();
        let set = spec.collect().unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn group_names() {
        assert_eq!(TestGroup::Async.to_string(), "async");
        assert_eq!(TestGroup::Sync.as_str(), "sync");
    }
}
