//! Per-file formatter operations: check (diff) and in-place (rewrite + mtime check).

use anyhow::{Context, Result};
use similar::TextDiff;
use std::path::Path;
use std::time::SystemTime;

use crate::formatters::{FileRef, Formatter};
use crate::utils::config::PATCH_CONTEXT_LINES;

/// Unified diff from `original` to `formatted`, labelled `a/<label>` and `b/<label>`.
/// Lines are compared as raw bytes, so the patch applies to files in any encoding.
/// Empty when the two are identical.
pub fn unified_patch(label: &str, original: &[u8], formatted: &[u8]) -> Result<Vec<u8>> {
    let diff = TextDiff::from_lines(original, formatted);
    let (old_label, new_label) = (format!("a/{}", label), format!("b/{}", label));
    let mut patch = Vec::new();
    diff.unified_diff()
        .context_radius(PATCH_CONTEXT_LINES)
        .header(&old_label, &new_label)
        .to_writer(&mut patch)
        .with_context(|| format!("render patch for {}", label))?;
    Ok(patch)
}

/// Read the file, run the formatter on its content, and diff. `label` is the path shown
/// in the patch headers (relative to the root).
pub fn create_patch_with_formatter(
    formatter: &dyn Formatter,
    args: &[String],
    file: FileRef<'_>,
    label: &str,
) -> Result<Vec<u8>> {
    let original = std::fs::read(file.path)
        .with_context(|| format!("read {}", file.path.display()))?;
    let formatted = formatter.format_to_buffer(args, file, &original)?;
    unified_patch(label, &original, &formatted)
}

fn modified_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("stat {}", path.display()))
}

/// Rewrite the file in place and report whether it changed.
///
/// "Changed" means the modification time moved strictly forward across the call. A
/// formatter that rewrites identical bytes counts as a change, and a filesystem with
/// coarse timestamps can hide one.
pub fn format_in_place_and_check_modified(
    formatter: &dyn Formatter,
    args: &[String],
    file: FileRef<'_>,
) -> Result<bool> {
    let original = std::fs::read(file.path)
        .with_context(|| format!("read {}", file.path.display()))?;
    let before = modified_time(file.path)?;

    if let Err(e) = formatter.format_in_place(args, file) {
        let left_modified = std::fs::read(file.path).map_or(true, |now| now != original);
        if left_modified {
            return Err(e.context(format!(
                "{} was left modified by the failed formatter",
                file.path.display()
            )));
        }
        return Err(e);
    }

    let after = modified_time(file.path)?;
    Ok(after > before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::fs;

    fn patch_text(label: &str, original: &str, formatted: &str) -> String {
        String::from_utf8(unified_patch(label, original.as_bytes(), formatted.as_bytes()).unwrap())
            .unwrap()
    }

    #[test]
    fn identical_content_has_empty_patch() {
        assert_eq!(patch_text("a.py", "x = 1\n", "x = 1\n"), "");
    }

    #[test]
    fn patch_has_ab_labels_and_hunk() {
        let patch = patch_text("src/a.py", "x=1\ny = 2\n", "x = 1\ny = 2\n");
        assert!(patch.starts_with("--- a/src/a.py\n+++ b/src/a.py\n@@ -1,2 +1,2 @@\n"));
        assert!(patch.contains("\n-x=1\n+x = 1\n y = 2\n"));
    }

    #[test]
    fn context_is_three_lines() {
        let original: String = (1..=20).map(|i| format!("line {i}\n")).collect();
        let formatted = original.replace("line 10\n", "line ten\n");
        let patch = patch_text("f.txt", &original, &formatted);
        assert!(patch.contains("@@ -7,7 +7,7 @@"), "{patch}");
        assert!(!patch.contains("line 6\n"));
        assert!(!patch.contains("line 14\n"));
    }

    #[test]
    fn non_utf8_bytes_survive_in_the_patch() {
        let patch = unified_patch("latin1.txt", b"caf\xe9 x\n", b"caf\xe9 X\n").unwrap();
        assert!(patch.windows(8).any(|w| w == b"-caf\xe9 x\n"));
        assert!(patch.windows(8).any(|w| w == b"+caf\xe9 X\n"));
        assert!(!patch.windows(3).any(|w| w == "\u{fffd}".as_bytes()));
    }

    /// Writes `scribble` over the file (when set), then fails.
    struct BrokenRewriter {
        scribble: Option<&'static str>,
    }

    impl Formatter for BrokenRewriter {
        fn name(&self) -> &str {
            "broken"
        }

        fn selectors(&self) -> Vec<String> {
            vec![".txt".to_string()]
        }

        fn is_available(&self) -> bool {
            true
        }

        fn format_to_buffer(&self, _args: &[String], _file: FileRef<'_>, _input: &[u8]) -> Result<Vec<u8>> {
            bail!("unused")
        }

        fn format_in_place(&self, _args: &[String], file: FileRef<'_>) -> Result<()> {
            if let Some(text) = self.scribble {
                fs::write(file.path, text)?;
            }
            bail!("syntax error on line 1")
        }
    }

    fn rewrite_with(formatter: &BrokenRewriter) -> (String, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "original\n").unwrap();
        let file = FileRef {
            path: &path,
            lines: &[],
            timeout: None,
        };
        let err = format_in_place_and_check_modified(formatter, &[], file).unwrap_err();
        (format!("{:#}", err), fs::read_to_string(&path).unwrap())
    }

    #[test]
    fn failed_rewrite_that_touched_the_file_says_so() {
        let (msg, content) = rewrite_with(&BrokenRewriter {
            scribble: Some("half writ"),
        });
        assert_eq!(content, "half writ");
        assert!(msg.contains("was left modified by the failed formatter"), "{msg}");
        assert!(msg.contains("syntax error on line 1"), "{msg}");
    }

    #[test]
    fn failed_rewrite_that_left_the_file_alone_is_the_plain_error() {
        let (msg, content) = rewrite_with(&BrokenRewriter { scribble: None });
        assert_eq!(content, "original\n");
        assert_eq!(msg, "syntax error on line 1");
    }
}
