//! Worker pool: each worker takes tasks off the shared queue, picks a formatter by selector,
//! runs it, and sends exactly one result per dispatched task.

use crossbeam_channel::{Receiver, Sender};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::diff::{create_patch_with_formatter, format_in_place_and_check_modified};
use crate::engine::tools::{path_to_slash_string, selector_key};
use crate::formatters::{FileRef, Formatter};
use crate::{FileTask, FormattingResult};

use super::context::DispatchContext;

/// Run one formatter over one task and package the outcome.
pub fn run_formatter(
    dispatch: &DispatchContext,
    task: &FileTask,
    formatter: &dyn Formatter,
) -> FormattingResult {
    let file_path = path_to_slash_string(&task.path);
    let abs_path = dispatch.root.join(&task.path);
    let file = FileRef {
        path: &abs_path,
        lines: &task.lines,
        timeout: dispatch.timeout,
    };
    let args = dispatch.args_for(formatter.name());

    let outcome = if dispatch.in_place {
        format_in_place_and_check_modified(formatter, args, file)
            .map(|modified| (modified, Vec::new()))
    } else {
        create_patch_with_formatter(formatter, args, file, &file_path)
            .map(|patch| (!patch.is_empty(), patch))
    };

    match outcome {
        Ok((format_needed, patch)) => FormattingResult {
            format_needed,
            patch,
            ..FormattingResult::new(file_path)
        },
        Err(e) => FormattingResult::failed(file_path, e.context(formatter.name().to_string())),
    }
}

/// Single worker: pull tasks until the source closes the queue. Tasks without a formatter
/// are dropped without a result. A panicking formatter still yields a (failed) result.
fn dispatch_worker_loop(
    task_rx: Receiver<FileTask>,
    result_tx: Sender<FormattingResult>,
    dispatch: Arc<DispatchContext>,
) {
    while let Ok(task) = task_rx.recv() {
        let Some(formatter) = selector_key(&task.path).and_then(|k| dispatch.formatters.get(&k))
        else {
            continue;
        };
        let result = catch_unwind(AssertUnwindSafe(|| {
            run_formatter(&dispatch, &task, formatter.as_ref())
        }))
        .unwrap_or_else(|_| {
            FormattingResult::failed(
                path_to_slash_string(&task.path),
                anyhow::anyhow!("formatter {} panicked", formatter.name()),
            )
        });
        if result_tx.send(result).is_err() {
            break;
        }
    }
    drop(result_tx);
}

/// Spawn `num_workers` workers sharing `task_rx`. At most `num_workers` formatter
/// invocations are ever in flight. The caller must drop its own `result_tx` afterwards so
/// the result channel disconnects once the last worker exits.
pub fn spawn_dispatch_workers(
    task_rx: Receiver<FileTask>,
    result_tx: &Sender<FormattingResult>,
    dispatch: Arc<DispatchContext>,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let dispatch = Arc::clone(&dispatch);
            thread::spawn(move || dispatch_worker_loop(task_rx, result_tx, dispatch))
        })
        .collect()
}
