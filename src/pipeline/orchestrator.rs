use anyhow::{Result, bail};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::RunContext;
use crate::engine::exclude::ExcludeSet;
use crate::engine::tools::check_root;
use crate::formatters::FormatterMap;
use crate::pipeline;
use crate::utils::effective_parallelism;

use super::context::DispatchContext;

/// Reject configurations that can never run, before any thread is started.
pub fn validate_run_context(ctx: &RunContext) -> Result<ExcludeSet> {
    check_root(&ctx.root)?;
    if ctx.parallelism == 0 {
        bail!("parallelism must be at least 1");
    }
    if ctx.in_place && ctx.patch_output.is_some() {
        bail!("a patch output cannot be combined with in-place formatting");
    }
    ExcludeSet::new(ctx.exclude.as_slice())
}

/// Start the source + dispatcher pipeline. Returns the result receiver and thread handles;
/// the caller drains `result_rx` and then joins via [`shutdown_pipeline_handles`].
///
/// Configuration errors and a failing git query are returned here, before any file has
/// been handed to a formatter.
pub fn run_pipeline(ctx: &RunContext, formatters: &FormatterMap) -> Result<pipeline::PipelineHandles> {
    let exclude = validate_run_context(ctx)?;
    let num_workers = effective_parallelism(ctx.parallelism);

    let changed = match ctx.git_diffbase.as_deref() {
        Some(diffbase) => Some(pipeline::git_changed_files(&ctx.root, diffbase, ctx.lines)?),
        None => None,
    };

    let channels = pipeline::create_pipeline_channels(ctx, exclude);
    let source_handle = match changed {
        Some(changed) => {
            pipeline::spawn_changed_files_thread(channels.task_tx, channels.ctx, changed)
        }
        None => pipeline::spawn_walk_thread(channels.task_tx, channels.ctx),
    };

    debug!(
        "pipeline: {} workers, {} formatters",
        num_workers,
        formatters.len()
    );
    let dispatch = Arc::new(DispatchContext::new(ctx, formatters));
    let worker_handles = pipeline::spawn_dispatch_workers(
        channels.task_rx,
        &channels.result_tx,
        dispatch,
        num_workers,
    );

    // Dropping the last sender closes the channel so the consumer sees the end.
    drop(channels.result_tx);

    Ok(pipeline::PipelineHandles {
        result_rx: channels.result_rx,
        source_handle,
        worker_handles,
        skipped_paths: channels.skipped_paths,
    })
}

/// Join the source and worker threads (after the result stream is drained) and log
/// skipped paths. Returns the number of tasks the source produced.
pub fn shutdown_pipeline_handles(
    source_handle: JoinHandle<usize>,
    worker_handles: Vec<JoinHandle<()>>,
    skipped_paths: &pipeline::SkippedPaths,
) -> Result<usize> {
    let sent = source_handle
        .join()
        .map_err(|_| anyhow::anyhow!("file source thread panicked"))?;
    for h in worker_handles {
        if h.join().is_err() {
            warn!("dispatch worker thread panicked outside a formatter call");
        }
    }
    pipeline::report_skipped_paths(skipped_paths);
    debug!("pipeline: source produced {} tasks", sent);
    Ok(sent)
}
