//! Binary entry point for the headstamp CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Prepend the import header to every async test file
//! headstamp inject async
//!
//! # Preview the change as a unified diff
//! headstamp inject sync --dry-run
//!
//! # Show which files would be touched
//! headstamp list async --format json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use headstamp::cli::{run_inject, run_list};
use headstamp::config::{CliOverrides, EnvOverrides, ResolvedConfig};
use headstamp::error::{HeadstampError, HeadstampResult, OutputErrorCode};
use headstamp::filter::TestGroup;
use headstamp::output::{emit_response, ErrorResponse, InjectResponse, ListResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Prepend a fixed import header to batches of test files.
#[derive(Parser, Debug)]
#[command(name = "headstamp", version, about = "Prepend import headers to test files")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Config file (default: headstamp.toml in workspace, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Test group argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GroupArg {
    /// Files under the async test directory.
    Async,
    /// Files under the sync test directory.
    Sync,
}

impl From<GroupArg> for TestGroup {
    fn from(group: GroupArg) -> Self {
        match group {
            GroupArg::Async => TestGroup::Async,
            GroupArg::Sync => TestGroup::Sync,
        }
    }
}

/// Output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Human-readable summary (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
}

/// Target selection shared by `inject` and `list`.
#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Test group to target.
    #[arg(value_enum)]
    group: GroupArg,
    /// Directory holding the group subdirectories (overrides config).
    #[arg(long)]
    test_root: Option<PathBuf>,
    /// Glob matched against paths inside the group directory (overrides config).
    #[arg(long)]
    pattern: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Prepend the header to every matching test file (not idempotent).
    Inject {
        #[command(flatten)]
        target: TargetArgs,
        /// Read the header text from this file instead of config.
        #[arg(long)]
        header_file: Option<PathBuf>,
        /// Preview changes without writing any file.
        #[arg(long)]
        dry_run: bool,
    },
    /// List the files a matching `inject` would rewrite.
    List {
        #[command(flatten)]
        target: TargetArgs,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            tracing::error!(code = error_code.code(), "{}", err);

            // Errors go to stdout as JSON, same channel as responses
            let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> HeadstampResult<()> {
    match cli.command {
        Command::Inject {
            target,
            header_file,
            dry_run,
        } => execute_inject(&cli.global, target, header_file, dry_run),
        Command::List { target } => execute_list(&cli.global, target),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_inject(
    global: &GlobalArgs,
    target: TargetArgs,
    header_file: Option<PathBuf>,
    dry_run: bool,
) -> HeadstampResult<()> {
    let header = header_file.map(|path| read_header_file(&path)).transpose()?;
    let config = resolve_config(global, &target, header)?;

    let response = run_inject(&config, target.group.into(), dry_run)?;

    match target.format {
        Format::Json => emit(&response),
        Format::Text => {
            print_inject_summary(&response);
            Ok(())
        }
    }
}

fn execute_list(global: &GlobalArgs, target: TargetArgs) -> HeadstampResult<()> {
    let config = resolve_config(global, &target, None)?;
    let response = run_list(&config, target.group.into())?;

    match target.format {
        Format::Json => emit(&response),
        Format::Text => {
            print_list(&response);
            Ok(())
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn resolve_config(
    global: &GlobalArgs,
    target: &TargetArgs,
    header: Option<String>,
) -> HeadstampResult<ResolvedConfig> {
    let workspace = match &global.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|e| HeadstampError::internal(format!("failed to get current directory: {}", e)))?,
    };
    if !workspace.is_dir() {
        return Err(HeadstampError::invalid_args(format!(
            "workspace is not a directory: {}",
            workspace.display()
        )));
    }

    let overrides = CliOverrides {
        config_path: global.config.clone(),
        test_root: target.test_root.clone(),
        pattern: target.pattern.clone(),
        header,
    };
    ResolvedConfig::resolve(&workspace, &EnvOverrides::from_env(), &overrides)
}

fn read_header_file(path: &Path) -> HeadstampResult<String> {
    fs::read_to_string(path).map_err(|e| {
        HeadstampError::invalid_args(format!(
            "cannot read header file {}: {}",
            path.display(),
            e
        ))
    })
}

fn emit<T: serde::Serialize>(response: &T) -> HeadstampResult<()> {
    emit_response(response, &mut io::stdout()).map_err(|e| HeadstampError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

fn print_inject_summary(response: &InjectResponse) {
    if response.dry_run {
        match response.diff.as_deref() {
            Some(diff) if !diff.is_empty() => print!("{}", diff),
            _ => println!("No changes."),
        }
        return;
    }

    if response.files.is_empty() {
        println!("No {} test files matched.", response.group);
        return;
    }
    for file in &response.files {
        println!("  {}", file.path);
    }
    println!(
        "Prepended header to {} {} test file(s) ({} bytes added).",
        response.files.len(),
        response.group,
        response.bytes_added
    );
}

fn print_list(response: &ListResponse) {
    for file in &response.files {
        println!("{}", file);
    }
}

// ============================================================================
// Tests
// ============================================================================
