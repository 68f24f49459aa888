//! Public and internal types for the stylize API and pipeline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::utils::config::DEFAULT_PARALLELISM;

/// Inclusive, 1-indexed range of lines on the new side of a diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// One file scheduled for formatting. Produced by a file source, consumed once by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTask {
    /// Path relative to the run root.
    pub path: PathBuf,
    /// Changed line ranges. Empty means "the whole file".
    pub lines: Vec<LineRange>,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: Vec::new(),
        }
    }

    pub fn with_lines(path: impl Into<PathBuf>, lines: Vec<LineRange>) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }
}

/// Outcome of running one formatter over one file.
#[derive(Debug)]
pub struct FormattingResult {
    /// Path relative to the run root, `/`-separated.
    pub file_path: String,
    pub format_needed: bool,
    /// Unified diff bytes (check mode only). Empty when the file is clean or in in-place mode.
    pub patch: Vec<u8>,
    pub error: Option<anyhow::Error>,
}

impl FormattingResult {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            format_needed: false,
            patch: Vec::new(),
            error: None,
        }
    }

    pub fn failed(file_path: impl Into<String>, error: anyhow::Error) -> Self {
        Self {
            error: Some(error),
            ..Self::new(file_path)
        }
    }

    /// True when this result contributes a hunk to the patch output.
    pub fn has_patch(&self) -> bool {
        self.error.is_none() && self.format_needed
    }
}

/// Counters accumulated by the reporter while draining the result stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub changed: usize,
    pub errored: usize,
}

impl RunStats {
    /// Process exit status for this run: 1 on any error, 2 when a check found work, else 0.
    pub fn exit_code(&self, in_place: bool) -> i32 {
        if self.errored > 0 {
            1
        } else if !in_place && self.changed > 0 {
            2
        } else {
            0
        }
    }
}

/// Where check mode writes its patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOutput {
    Stdout,
    File(PathBuf),
}

impl PatchOutput {
    /// `-` means stdout; anything else is a file path.
    pub fn parse(arg: &str) -> Self {
        match arg {
            "-" => PatchOutput::Stdout,
            path => PatchOutput::File(PathBuf::from(path)),
        }
    }
}

/// Full configuration for one run. Read-only once the pipeline starts.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Absolute directory every file path is relative to.
    pub root: PathBuf,
    /// Exclude patterns, relative to `root`.
    pub exclude: Vec<String>,
    /// When set, only files changed since this git ref are considered.
    pub git_diffbase: Option<String>,
    /// Attach changed line ranges to tasks (only meaningful with `git_diffbase`).
    pub lines: bool,
    /// Rewrite files instead of checking them.
    pub in_place: bool,
    /// Patch destination for check mode.
    pub patch_output: Option<PatchOutput>,
    /// Max formatter invocations in flight.
    pub parallelism: usize,
    /// Extra command-line args per formatter, keyed by formatter name.
    pub formatter_args: HashMap<String, Vec<String>>,
    /// Selector (extension or bare filename) -> formatter name. `None` means auto-discovery.
    pub formatters_by_ext: Option<BTreeMap<String, String>>,
    /// Kill a formatter process that runs longer than this.
    pub timeout: Option<Duration>,
    /// Set from outside (e.g. Ctrl+C) to stop feeding new files into the pipeline.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl RunContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
            git_diffbase: None,
            lines: false,
            in_place: false,
            patch_output: None,
            parallelism: DEFAULT_PARALLELISM,
            formatter_args: HashMap::new(),
            formatters_by_ext: None,
            timeout: None,
            cancel: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
