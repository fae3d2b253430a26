//! CLI front door.
//!
//! Provides the command implementations behind the `headstamp` binary:
//! - `inject <group>` - Prepend the header to every target in the group
//! - `inject <group> --dry-run` - Report and diff without writing
//! - `list <group>` - Show the target set
//!
//! The caller (typically `main.rs`) resolves configuration with
//! [`ResolvedConfig::resolve`] and hands it to these functions. All of them
//! return `Result<T, HeadstampError>`; rendering is left to the caller.

use std::path::Path;

use tracing::info;

use crate::config::ResolvedConfig;
use crate::error::HeadstampResult;
use crate::filter::{TargetSpec, TestGroup};
use crate::inject::{inject_all, preview_all};
use crate::output::{InjectResponse, ListResponse};

/// Build the target spec for `group` from resolved config.
pub fn target_spec(config: &ResolvedConfig, group: TestGroup) -> HeadstampResult<TargetSpec> {
    TargetSpec::for_group(
        &config.test_root_path(),
        config.group_dir(group),
        &config.pattern.value,
    )
}

/// Prepend the configured header to every file in `group`.
pub fn run_inject(
    config: &ResolvedConfig,
    group: TestGroup,
    dry_run: bool,
) -> HeadstampResult<InjectResponse> {
    let spec = target_spec(config, group)?;
    let targets = spec.collect()?;
    let header = config.header();

    let report = if dry_run {
        preview_all(&targets, &header)?
    } else {
        inject_all(&targets, &header)?
    };

    info!(
        group = %group,
        files = report.file_count(),
        dry_run,
        "inject finished"
    );

    Ok(InjectResponse::from_report(group.as_str(), &report, |p| {
        workspace_relative(&config.workspace, p)
    }))
}

/// List the files `run_inject` would touch.
pub fn run_list(config: &ResolvedConfig, group: TestGroup) -> HeadstampResult<ListResponse> {
    let spec = target_spec(config, group)?;
    let targets = spec.collect()?;
    let files = targets
        .files()
        .iter()
        .map(|p| workspace_relative(&config.workspace, p))
        .collect();

    Ok(ListResponse::new(
        group.as_str(),
        workspace_relative(&config.workspace, spec.dir()),
        spec.pattern(),
        files,
    ))
}

fn workspace_relative(workspace: &Path, path: &Path) -> String {
    path.strip_prefix(workspace)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, EnvOverrides};
    use crate::header::Header;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        for rel in [
            "test/async/map.test.ts",
            "test/async/util.ts",
            "test/sync/map.test.ts",
            "src/index.ts",
        ] {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "describe(\"x\", () => {})").unwrap();
        }
        dir
    }

    fn resolve(dir: &Path) -> ResolvedConfig {
        ResolvedConfig::resolve(dir, &EnvOverrides::default(), &CliOverrides::default()).unwrap()
    }

    #[test]
    fn list_reports_group_targets() {
        let ws = workspace();
        let response = run_list(&resolve(ws.path()), TestGroup::Async).unwrap();

        assert_eq!(response.dir, "test/async");
        assert_eq!(response.files, vec!["test/async/map.test.ts"]);
    }

    #[test]
    fn inject_touches_only_selected_group() {
        let ws = workspace();
        let response = run_inject(&resolve(ws.path()), TestGroup::Sync, false).unwrap();

        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].path, "test/sync/map.test.ts");

        let header = Header::default();
        let synced = fs::read_to_string(ws.path().join("test/sync/map.test.ts")).unwrap();
        assert!(synced.starts_with(header.as_str()));
        for untouched in ["test/async/map.test.ts", "test/async/util.ts", "src/index.ts"] {
            let content = fs::read_to_string(ws.path().join(untouched)).unwrap();
            assert_eq!(content, "describe(\"x\", () => {})", "{} changed", untouched);
        }
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let ws = workspace();
        let response = run_inject(&resolve(ws.path()), TestGroup::Async, true).unwrap();

        assert!(response.dry_run);
        assert!(response.diff.as_deref().unwrap().contains("map.test.ts"));
        let content = fs::read_to_string(ws.path().join("test/async/map.test.ts")).unwrap();
        assert_eq!(content, "describe(\"x\", () => {})");
    }
}
