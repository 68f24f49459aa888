//! Formatter capability and the registry that maps file selectors to formatters.
//!
//! A formatter is an opaque external tool behind the [`Formatter`] trait. The crate ships
//! command-line formatters ([`CommandFormatter`], see [`builtin`]) plus an in-process YAML
//! formatter; tests and library users can register their own implementations.

pub mod builtin;
pub mod command;
pub mod registry;
pub mod yaml;

pub use builtin::{builtin_formatters, command_formatters};
pub use command::{CommandFormatter, run_io_command};
pub use registry::{FormatterMap, FormatterRegistry};
pub use yaml::YamlFormatter;

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use crate::LineRange;

/// What a formatter gets to know about the file it works on.
#[derive(Clone, Copy, Debug)]
pub struct FileRef<'a> {
    /// Absolute path.
    pub path: &'a Path,
    /// Changed line ranges; empty means the whole file. Formatters may ignore this.
    pub lines: &'a [LineRange],
    /// Upper bound on one invocation, if the run has one.
    pub timeout: Option<Duration>,
}

/// Common interface for all formatters.
pub trait Formatter: Send + Sync {
    /// Registry name; also the key for per-formatter extra args.
    fn name(&self) -> &str;

    /// Extensions (with the leading `.`) and bare file names this formatter handles.
    fn selectors(&self) -> Vec<String>;

    /// Whether the formatter can run here (e.g. its binary is installed).
    fn is_available(&self) -> bool;

    /// Format `input` and return the formatted bytes. The file on disk is not touched.
    fn format_to_buffer(&self, args: &[String], file: FileRef<'_>, input: &[u8]) -> Result<Vec<u8>>;

    /// Rewrite the file in place.
    fn format_in_place(&self, args: &[String], file: FileRef<'_>) -> Result<()>;
}
