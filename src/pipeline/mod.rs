//! Pipeline components: file sources, dispatch workers, patch aggregation.

pub mod context;
pub mod dispatch;
pub mod error_handler;
pub mod git;
pub mod orchestrator;
pub mod patch;
pub mod walk;

pub use context::{
    DispatchContext, PipelineChannels, PipelineContext, PipelineHandles, SkippedPaths,
    create_pipeline_channels,
};
pub use dispatch::{run_formatter, spawn_dispatch_workers};
pub use error_handler::report_skipped_paths;
pub use git::{ChangedFiles, git_changed_files, run_changed_files_loop, spawn_changed_files_thread};
pub use orchestrator::{run_pipeline, shutdown_pipeline_handles, validate_run_context};
pub use patch::PatchCollector;
pub use walk::{WalkOutcome, run_walk_loop, spawn_walk_thread, to_outcome_walkdir};
