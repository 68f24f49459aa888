//! In-place mode: rewrite files through their formatters and report which ones changed.

use anyhow::{Result, bail};
use log::debug;
use std::io::Write;

use crate::engine::report::Reporter;
use crate::formatters::FormatterMap;
use crate::pipeline::{PipelineHandles, run_pipeline, shutdown_pipeline_handles};
use crate::{RunContext, RunStats};

/// Format every file `ctx` selects in place. Each file is rewritten independently; a failure
/// on one file is reported and counted but does not stop the others.
pub fn format_dir<W: Write>(
    ctx: &RunContext,
    formatters: &FormatterMap,
    reporter: &mut Reporter<W>,
) -> Result<RunStats> {
    if !ctx.in_place {
        bail!("format_dir needs an in-place context (in_place = true)");
    }
    let PipelineHandles {
        result_rx,
        source_handle,
        worker_handles,
        skipped_paths,
    } = run_pipeline(ctx, formatters)?;

    let stats = reporter.consume(result_rx.iter());
    debug!(
        "format: {} results, {} formatted, {} errors",
        stats.total, stats.changed, stats.errored
    );

    shutdown_pipeline_handles(source_handle, worker_handles, &skipped_paths)?;
    Ok(stats)
}
