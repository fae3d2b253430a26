//! Configuration handling for headstamp.
//!
//! Values resolve in precedence order (lowest to highest):
//!
//! 1. Built-in defaults
//! 2. `headstamp.toml` (`[headstamp]` table) in the workspace, or `--config`
//! 3. Environment variables (`HEADSTAMP_TEST_ROOT`, `HEADSTAMP_PATTERN`)
//! 4. CLI flags
//!
//! Each resolved value carries its [`ConfigSource`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HeadstampError, HeadstampResult};
use crate::filter::{TestGroup, DEFAULT_PATTERN};
use crate::header::{Header, DEFAULT_HEADER};

/// Config file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "headstamp.toml";

/// Environment variable overriding the test root.
pub const ENV_TEST_ROOT: &str = "HEADSTAMP_TEST_ROOT";

/// Environment variable overriding the glob pattern.
pub const ENV_PATTERN: &str = "HEADSTAMP_PATTERN";

// ============================================================================
// File Config
// ============================================================================

/// Contents of `headstamp.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub headstamp: HeadstampConfig,
}

/// The `[headstamp]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadstampConfig {
    /// Directory holding the group subdirectories, relative to the workspace.
    #[serde(default = "default_test_root")]
    pub test_root: PathBuf,

    /// Glob matched against paths relative to the group directory.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Subdirectory for async tests.
    #[serde(default = "default_async_dir")]
    pub async_dir: String,

    /// Subdirectory for sync tests.
    #[serde(default = "default_sync_dir")]
    pub sync_dir: String,

    /// Header text to prepend.
    #[serde(default = "default_header")]
    pub header: String,
}

fn default_test_root() -> PathBuf {
    PathBuf::from("test")
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_async_dir() -> String {
    "async".to_string()
}

fn default_sync_dir() -> String {
    "sync".to_string()
}

fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}

impl Default for HeadstampConfig {
    fn default() -> Self {
        Self {
            test_root: default_test_root(),
            pattern: default_pattern(),
            async_dir: default_async_dir(),
            sync_dir: default_sync_dir(),
            header: default_header(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> HeadstampResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| HeadstampError::Config {
            path: path.to_path_buf(),
            message: format!("failed to read config file: {}", e),
        })?;
        toml::from_str(&content).map_err(|e| HeadstampError::Config {
            path: path.to_path_buf(),
            message: format!("failed to parse config file: {}", e),
        })
    }

    /// Load `headstamp.toml` from the workspace root, or defaults if absent.
    pub fn load_from_workspace(workspace: &Path) -> HeadstampResult<(Self, bool)> {
        let config_path = workspace.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            debug!(path = %config_path.display(), "loading config");
            Ok((Self::load(&config_path)?, true))
        } else {
            Ok((Config::default(), false))
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the config file.
    ConfigFile = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A value tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --config flag.
    pub config_path: Option<PathBuf>,
    /// --test-root flag.
    pub test_root: Option<PathBuf>,
    /// --pattern flag.
    pub pattern: Option<String>,
    /// Contents of --header-file.
    pub header: Option<String>,
}

/// Environment overrides, captured once so resolution stays pure.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub test_root: Option<PathBuf>,
    pub pattern: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        EnvOverrides {
            test_root: std::env::var_os(ENV_TEST_ROOT).map(PathBuf::from),
            pattern: std::env::var(ENV_PATTERN).ok(),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Workspace root every relative path is joined to.
    pub workspace: PathBuf,
    pub test_root: ConfigValue<PathBuf>,
    pub pattern: ConfigValue<String>,
    pub async_dir: ConfigValue<String>,
    pub sync_dir: ConfigValue<String>,
    pub header: ConfigValue<String>,
}

impl ResolvedConfig {
    /// Resolve config for `workspace` from all sources.
    pub fn resolve(
        workspace: &Path,
        env: &EnvOverrides,
        overrides: &CliOverrides,
    ) -> HeadstampResult<Self> {
        let (file, file_source) = match &overrides.config_path {
            Some(path) => (Config::load(&workspace.join(path))?, ConfigSource::ConfigFile),
            None => match Config::load_from_workspace(workspace)? {
                (config, true) => (config, ConfigSource::ConfigFile),
                (config, false) => (config, ConfigSource::Default),
            },
        };

        let mut resolved = ResolvedConfig::from_file(workspace, file.headstamp, file_source);
        resolved.apply_env(env);
        resolved.apply_cli_overrides(overrides);
        Ok(resolved)
    }

    fn from_file(workspace: &Path, file: HeadstampConfig, source: ConfigSource) -> Self {
        ResolvedConfig {
            workspace: workspace.to_path_buf(),
            test_root: ConfigValue::new(file.test_root, source),
            pattern: ConfigValue::new(file.pattern, source),
            async_dir: ConfigValue::new(file.async_dir, source),
            sync_dir: ConfigValue::new(file.sync_dir, source),
            header: ConfigValue::new(file.header, source),
        }
    }

    fn apply_env(&mut self, env: &EnvOverrides) {
        overlay(&mut self.test_root, env.test_root.as_ref(), ConfigSource::EnvVar);
        overlay(&mut self.pattern, env.pattern.as_ref(), ConfigSource::EnvVar);
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        overlay(&mut self.test_root, overrides.test_root.as_ref(), ConfigSource::CliFlag);
        overlay(&mut self.pattern, overrides.pattern.as_ref(), ConfigSource::CliFlag);
        overlay(&mut self.header, overrides.header.as_ref(), ConfigSource::CliFlag);
    }

    /// Absolute test root (joined to the workspace when relative).
    pub fn test_root_path(&self) -> PathBuf {
        self.workspace.join(&self.test_root.value)
    }

    /// Subdirectory name configured for `group`.
    pub fn group_dir(&self, group: TestGroup) -> &str {
        match group {
            TestGroup::Async => &self.async_dir.value,
            TestGroup::Sync => &self.sync_dir.value,
        }
    }

    pub fn header(&self) -> Header {
        Header::new(self.header.value.clone())
    }
}

/// Merge `value` from `source` into `slot`, keeping whichever ranks higher.
fn overlay<T: Clone>(slot: &mut ConfigValue<T>, value: Option<&T>, source: ConfigSource) {
    if let Some(value) = value {
        *slot = slot.clone().merge(ConfigValue::new(value.clone(), source));
    }
}
