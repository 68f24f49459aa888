//! Engine module: per-file operations, exclusion, reporting and the CLI front end.

pub mod arg_parser;
pub mod cli;
pub mod diff;
pub mod exclude;
pub mod report;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use diff::{create_patch_with_formatter, format_in_place_and_check_modified, unified_patch};
pub use exclude::{ExcludeSet, file_is_excluded};
pub use report::Reporter;
pub use tools::{path_relative_to, selector_key};
