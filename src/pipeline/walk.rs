//! Full-tree file source: walk the root, prune excluded directories, send files to the workers.

use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::FileTask;
use crate::engine::tools::{is_vcs_metadata_dir, path_relative_to, path_to_slash_string};

use super::context::PipelineContext;

/// One result from a directory walk: either a file to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`]. Directories yield `None`: they are only
/// walked through, never formatted.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> Option<WalkOutcome> {
    match r {
        Ok(entry) if entry.file_type().is_dir() => None,
        Ok(entry) => Some(WalkOutcome::Ok(entry.into_path())),
        Err(err) => Some(WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        }),
    }
}

/// Walk `ctx.root`. Excluded entries are filtered before they are yielded, so an excluded
/// directory is never read. VCS metadata directories are always pruned.
fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome> + '_> {
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if entry.file_type().is_dir() && is_vcs_metadata_dir(entry.path()) {
                    return false;
                }
                match path_relative_to(entry.path(), &ctx.root) {
                    Some(rel) => !ctx.exclude.is_excluded(&path_to_slash_string(&rel)),
                    None => true,
                }
            })
            .filter_map(to_outcome_walkdir),
    )
}

pub fn spawn_walk_thread(task_tx: Sender<FileTask>, ctx: PipelineContext) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        run_walk_loop(&task_tx, &ctx, iter)
    })
}

/// Consume `iter`, send each file (relative to the root) to `task_tx`, and record unreadable
/// entries in `ctx.skipped_paths` instead of failing. Stops early when the run is cancelled
/// or every worker has gone. Returns the number of tasks sent.
pub fn run_walk_loop<I>(task_tx: &Sender<FileTask>, ctx: &PipelineContext, iter: I) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        if ctx.is_cancelled() {
            log::debug!("walk: cancelled after {} files", count);
            break;
        }
        match outcome {
            WalkOutcome::Ok(path) => {
                let Some(rel) = path_relative_to(&path, &ctx.root) else {
                    continue;
                };
                if task_tx.send(FileTask::new(rel)).is_err() {
                    break;
                }
                count += 1;
            }
            WalkOutcome::Err { msg, path } => {
                log::debug!("walk: skipping entry: {}", msg);
                let path = path.unwrap_or_else(|| PathBuf::from("<no-path>"));
                ctx.record_skipped(path, msg);
            }
        }
    }
    count
}
