use super::context::SkippedPaths;

/// Log walk entries that were skipped because they could not be read.
/// Call after joining the source thread.
pub fn report_skipped_paths(skipped_paths: &SkippedPaths) {
    let Ok(skipped) = skipped_paths.lock() else {
        return;
    };
    if skipped.is_empty() {
        return;
    }
    log::warn!(
        "Skipped {} paths due to permission errors or access issues",
        skipped.len()
    );
    for (path, msg) in skipped.iter() {
        log::debug!("  skipped: {} ({})", path.display(), msg);
    }
}
