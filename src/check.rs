//! Check mode: run formatters into memory and report (optionally patch) what would change.

use anyhow::{Context, Result, bail};
use log::debug;
use std::io::Write;

use crate::engine::report::Reporter;
use crate::formatters::FormatterMap;
use crate::pipeline::{PatchCollector, PipelineHandles, run_pipeline, shutdown_pipeline_handles};
use crate::{RunContext, RunStats};

/// Check every file `ctx` selects without touching it.
///
/// With `patch_sink` set, the patches of files that need formatting are written to it once
/// all results are in, sorted by path. Progress and the summary go to `reporter`.
pub fn check_dir<W: Write>(
    ctx: &RunContext,
    formatters: &FormatterMap,
    patch_sink: Option<&mut dyn Write>,
    reporter: &mut Reporter<W>,
) -> Result<RunStats> {
    if ctx.in_place {
        bail!("check_dir needs a check-mode context (in_place = false)");
    }
    let PipelineHandles {
        result_rx,
        source_handle,
        worker_handles,
        skipped_paths,
    } = run_pipeline(ctx, formatters)?;

    let stats = match patch_sink {
        Some(out) => {
            let mut collector = PatchCollector::new(result_rx.iter(), out);
            let stats = reporter.consume(&mut collector);
            collector.finish().context("write patch")?;
            stats
        }
        None => reporter.consume(result_rx.iter()),
    };
    debug!(
        "check: {} results, {} need formatting, {} errors",
        stats.total, stats.changed, stats.errored
    );

    shutdown_pipeline_handles(source_handle, worker_handles, &skipped_paths)?;
    Ok(stats)
}
