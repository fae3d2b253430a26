//! Headstamp: prepend a fixed import header to batches of test files.
//!
//! ## Modules
//!
//! - `filter` - Target directory walk and glob matching
//! - `header` - The header text and the prepend operation
//! - `inject` - In-place rewrite of every target file
//! - `diff` - Unified diff previews for dry runs
//! - `config` - `headstamp.toml`, environment and CLI resolution
//! - `output` - JSON response types
//! - `cli` - Command implementations used by the binary

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod header;
pub mod inject;
pub mod output;

pub use error::{HeadstampError, HeadstampResult, OutputErrorCode};
pub use filter::{TargetSet, TargetSpec, TestGroup};
pub use header::{Header, DEFAULT_HEADER};
pub use inject::{inject_all, inject_file, InjectReport};
