//! Changed-since-baseline file source: ask git which files differ from a ref, then feed
//! the ones that still exist (and are not excluded) to the workers.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use git2::{DiffOptions, Repository};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::tools::{path_relative_to, path_to_slash_string};
use crate::{FileTask, LineRange};

use super::context::PipelineContext;

/// Answer of the version-control query.
#[derive(Debug, Default)]
pub struct ChangedFiles {
    /// Absolute top-level directory of the repository's working tree.
    pub git_root: PathBuf,
    /// Changed paths relative to `git_root`, sorted, with new-side changed line ranges
    /// (only filled when requested).
    pub files: BTreeMap<PathBuf, Vec<LineRange>>,
}

/// Files that differ between `diffbase` and the working tree (staged or not), like
/// `git diff --name-only <diffbase>` run from `root`.
///
/// Any failure (not a repository, unknown ref, bare repository) is returned as an error;
/// there is no sensible partial answer.
pub fn git_changed_files(root: &Path, diffbase: &str, with_lines: bool) -> Result<ChangedFiles> {
    let repo = Repository::discover(root)
        .with_context(|| format!("find git repository containing {}", root.display()))?;
    let git_root = repo
        .workdir()
        .context("git repository has no working tree")?
        .to_path_buf();
    let base_tree = repo
        .revparse_single(diffbase)
        .and_then(|obj| obj.peel_to_tree())
        .with_context(|| format!("resolve git diffbase '{}'", diffbase))?;

    let mut opts = DiffOptions::new();
    opts.context_lines(0);
    let diff = repo
        .diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut opts))
        .with_context(|| format!("git diff against '{}'", diffbase))?;

    let mut files: BTreeMap<PathBuf, Vec<LineRange>> = BTreeMap::new();
    for delta in diff.deltas() {
        if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
            files.entry(path.to_path_buf()).or_default();
        }
    }

    if with_lines {
        diff.foreach(
            &mut |_, _| true,
            None,
            Some(&mut |delta, hunk| {
                if hunk.new_lines() > 0
                    && let Some(path) = delta.new_file().path()
                {
                    files.entry(path.to_path_buf()).or_default().push(LineRange {
                        start: hunk.new_start(),
                        end: hunk.new_start() + hunk.new_lines() - 1,
                    });
                }
                true
            }),
            None,
        )
        .context("collect changed line ranges")?;
    }

    log::debug!(
        "git: {} paths differ from {} under {}",
        files.len(),
        diffbase,
        git_root.display()
    );
    Ok(ChangedFiles { git_root, files })
}

pub fn spawn_changed_files_thread(
    task_tx: Sender<FileTask>,
    ctx: PipelineContext,
    changed: ChangedFiles,
) -> JoinHandle<usize> {
    thread::spawn(move || run_changed_files_loop(&task_tx, &ctx, changed))
}

/// Re-root each changed path onto `ctx.root`, drop excluded ones, files outside the root,
/// and paths that no longer exist (deletions, renamed-away files), and send the rest.
/// Returns the number of tasks sent.
pub fn run_changed_files_loop(
    task_tx: &Sender<FileTask>,
    ctx: &PipelineContext,
    changed: ChangedFiles,
) -> usize {
    // Compare canonical forms: the repository root may be reported through a different
    // spelling (symlinks) than the configured root.
    let root = ctx.root.canonicalize().unwrap_or_else(|_| ctx.root.clone());
    let git_root = changed
        .git_root
        .canonicalize()
        .unwrap_or_else(|_| changed.git_root.clone());

    let mut count = 0_usize;
    for (path, lines) in changed.files {
        if ctx.is_cancelled() {
            log::debug!("git: cancelled after {} files", count);
            break;
        }
        let abs = git_root.join(&path);
        let Some(rel) = path_relative_to(&abs, &root) else {
            log::debug!("git: {} is outside the root, skipping", path.display());
            continue;
        };
        if ctx.exclude.is_excluded(&path_to_slash_string(&rel)) {
            continue;
        }
        if !abs.is_file() {
            log::debug!("git: {} no longer exists, skipping", rel.display());
            continue;
        }
        if task_tx.send(FileTask::with_lines(rel, lines)).is_err() {
            break;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::exclude::ExcludeSet;
    use crossbeam_channel::unbounded;
    use std::fs;
    use std::sync::{Arc, Mutex};

    fn ctx(root: &Path, exclude: &[&str]) -> PipelineContext {
        PipelineContext {
            root: root.to_path_buf(),
            exclude: ExcludeSet::new(exclude).unwrap(),
            cancel: None,
            skipped_paths: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[test]
    fn rerooted_existing_unexcluded_files_are_sent() {
        let repo = tempfile::tempdir().unwrap();
        let root = repo.path().join("sub");
        fs::create_dir_all(root.join("exclude")).unwrap();
        fs::write(root.join("a.cpp"), "a").unwrap();
        fs::write(root.join("exclude/b.cpp"), "b").unwrap();
        fs::write(repo.path().join("outside.cpp"), "o").unwrap();

        let changed = ChangedFiles {
            git_root: repo.path().to_path_buf(),
            files: BTreeMap::from([
                (PathBuf::from("sub/a.cpp"), vec![LineRange { start: 2, end: 3 }]),
                (PathBuf::from("sub/exclude/b.cpp"), vec![]),
                (PathBuf::from("sub/deleted.cpp"), vec![]),
                (PathBuf::from("outside.cpp"), vec![]),
            ]),
        };
        let (tx, rx) = unbounded();
        let sent = run_changed_files_loop(&tx, &ctx(&root, &["exclude"]), changed);
        drop(tx);
        let tasks: Vec<FileTask> = rx.iter().collect();
        assert_eq!(sent, 1);
        assert_eq!(
            tasks,
            vec![FileTask::with_lines("a.cpp", vec![LineRange { start: 2, end: 3 }])]
        );
    }

    #[test]
    fn not_a_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(git_changed_files(dir.path(), "master", false).is_err());
    }
}
