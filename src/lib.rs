//! Stylize: run external code formatters over a directory tree (or the files changed since a
//! git ref) with bounded parallelism, in place or as a deterministic patch.

pub mod check;
pub mod engine;
pub mod format;
pub mod formatters;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use anyhow::Context;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::engine::report::Reporter;
use crate::formatters::{FormatterMap, FormatterRegistry};

/// Result alias used by public stylize API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: resolve formatters from `registry` (explicit mapping from
/// `ctx.formatters_by_ext` or auto-discovery), run the pipeline, report progress on stderr
/// and return the run's counters.
///
/// Configuration errors are returned before any file is processed. Per-file failures are
/// counted in [`RunStats::errored`], not returned.
pub fn stylize_dir(ctx: &RunContext, registry: &FormatterRegistry) -> Result<RunStats> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        ctx
    );
    let formatters = registry.resolve(ctx.formatters_by_ext.as_ref())?;
    let mut reporter = Reporter::stderr(ctx.in_place);
    run_with_formatters(ctx, &formatters, &mut reporter)
}

/// Run with an already resolved selector -> formatter map and a caller-chosen reporter.
/// Check mode writes the patch to `ctx.patch_output` when one is set.
pub fn run_with_formatters<W: Write>(
    ctx: &RunContext,
    formatters: &FormatterMap,
    reporter: &mut Reporter<W>,
) -> Result<RunStats> {
    if ctx.in_place {
        return format::format_dir(ctx, formatters, reporter);
    }
    match &ctx.patch_output {
        None => check::check_dir(ctx, formatters, None, reporter),
        Some(PatchOutput::Stdout) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            check::check_dir(ctx, formatters, Some(&mut out), reporter)
        }
        Some(PatchOutput::File(path)) => {
            // Validate first so a bad configuration does not leave an empty patch file behind.
            pipeline::validate_run_context(ctx)?;
            let file = File::create(path)
                .with_context(|| format!("create patch file {}", path.display()))?;
            info!("Writing patch to {}", path.display());
            let mut out = BufWriter::new(file);
            check::check_dir(ctx, formatters, Some(&mut out), reporter)
        }
    }
}
