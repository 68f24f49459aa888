//! Pipeline context and channels: shared data handed to the source thread and the workers.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::engine::exclude::ExcludeSet;
use crate::formatters::FormatterMap;
use crate::utils::config::PIPELINE_CHANNEL_CAP;
use crate::{FileTask, FormattingResult, RunContext};

/// Walk entries that could not be read: (path or placeholder, error message).
pub type SkippedPaths = Arc<Mutex<Vec<(PathBuf, String)>>>;

/// Shared context for the file source. Built in `run_pipeline` and moved into the source
/// thread so both source variants see the same root, excludes and skip list.
pub struct PipelineContext {
    pub root: PathBuf,
    pub exclude: ExcludeSet,
    pub cancel: Option<Arc<AtomicBool>>,
    pub skipped_paths: SkippedPaths,
}

impl PipelineContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn record_skipped(&self, path: PathBuf, msg: String) {
        if let Ok(mut skipped) = self.skipped_paths.lock() {
            skipped.push((path, msg));
        }
    }
}

/// Read-only state every worker needs. One instance per run, shared through an `Arc`.
pub struct DispatchContext {
    pub root: PathBuf,
    pub formatters: FormatterMap,
    pub formatter_args: HashMap<String, Vec<String>>,
    pub in_place: bool,
    pub timeout: Option<Duration>,
}

impl DispatchContext {
    pub fn new(ctx: &RunContext, formatters: &FormatterMap) -> Self {
        Self {
            root: ctx.root.clone(),
            formatters: formatters.clone(),
            formatter_args: ctx.formatter_args.clone(),
            in_place: ctx.in_place,
            timeout: ctx.timeout,
        }
    }

    pub fn args_for(&self, formatter: &str) -> &[String] {
        self.formatter_args
            .get(formatter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): drain `result_rx`, then join.
/// `result_rx` disconnects once the source is exhausted and every worker has finished.
pub struct PipelineHandles {
    pub result_rx: Receiver<FormattingResult>,
    pub source_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub skipped_paths: SkippedPaths,
}

/// Channels and shared state for the pipeline. The source gets `task_tx` and `ctx`; workers
/// get `task_rx` and `result_tx`.
pub struct PipelineChannels {
    pub task_tx: Sender<FileTask>,
    pub task_rx: Receiver<FileTask>,
    pub result_tx: Sender<FormattingResult>,
    pub result_rx: Receiver<FormattingResult>,
    pub skipped_paths: SkippedPaths,
    pub ctx: PipelineContext,
}

pub fn create_pipeline_channels(run: &RunContext, exclude: ExcludeSet) -> PipelineChannels {
    let (task_tx, task_rx) = bounded::<FileTask>(PIPELINE_CHANNEL_CAP);
    let (result_tx, result_rx) = bounded::<FormattingResult>(PIPELINE_CHANNEL_CAP);
    let skipped_paths: SkippedPaths = Arc::new(Mutex::new(Vec::new()));

    let ctx = PipelineContext {
        root: run.root.clone(),
        exclude,
        cancel: run.cancel.clone(),
        skipped_paths: Arc::clone(&skipped_paths),
    };

    PipelineChannels {
        task_tx,
        task_rx,
        result_tx,
        result_rx,
        skipped_paths,
        ctx,
    }
}
