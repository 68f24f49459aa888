//! Patch aggregation: pass results through untouched while keeping the patches, then write
//! them sorted by path once the stream ends.

use std::io::{self, Write};

use crate::FormattingResult;

/// Iterator adapter between the workers and the reporter.
///
/// Every item is yielded unchanged and in arrival order, so progress output stays live.
/// Patches of error-free results that need formatting are buffered; when the inner
/// iterator is exhausted they are sorted by file path and written to `out`, each followed
/// by a blank line. Worker completion order therefore never shows in the patch.
pub struct PatchCollector<'w, I> {
    inner: I,
    out: &'w mut dyn Write,
    pending: Vec<(String, Vec<u8>)>,
    written: bool,
    error: Option<io::Error>,
}

impl<'w, I> PatchCollector<'w, I>
where
    I: Iterator<Item = FormattingResult>,
{
    pub fn new(inner: I, out: &'w mut dyn Write) -> Self {
        Self {
            inner,
            out,
            pending: Vec::new(),
            written: false,
            error: None,
        }
    }

    fn write_patch(&mut self) -> io::Result<()> {
        self.pending.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, patch) in &self.pending {
            self.out.write_all(patch)?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    /// Drain whatever is left, make sure the patch is written, and report a write failure.
    pub fn finish(mut self) -> io::Result<()> {
        for _ in self.by_ref() {}
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<I> Iterator for PatchCollector<'_, I>
where
    I: Iterator<Item = FormattingResult>,
{
    type Item = FormattingResult;

    fn next(&mut self) -> Option<FormattingResult> {
        match self.inner.next() {
            Some(result) => {
                if result.has_patch() {
                    self.pending
                        .push((result.file_path.clone(), result.patch.clone()));
                }
                Some(result)
            }
            None => {
                if !self.written {
                    self.written = true;
                    if let Err(e) = self.write_patch() {
                        self.error = Some(e);
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs(path: &str, patch: &str) -> FormattingResult {
        FormattingResult {
            format_needed: true,
            patch: patch.as_bytes().to_vec(),
            ..FormattingResult::new(path)
        }
    }

    #[test]
    fn writes_sorted_patches_separated_by_blank_lines() {
        let results = vec![
            needs("b", "diff3\ndiff4\n"),
            needs("a", "diff1\ndiff2\n"),
        ];
        let mut out = Vec::new();
        let mut collector = PatchCollector::new(results.into_iter(), &mut out);
        let forwarded: Vec<String> = collector.by_ref().map(|r| r.file_path).collect();
        collector.finish().unwrap();

        assert_eq!(forwarded, vec!["b", "a"]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "diff1\ndiff2\n\ndiff3\ndiff4\n\n"
        );
    }

    #[test]
    fn skips_clean_and_failed_results() {
        let results = vec![
            FormattingResult::new("clean"),
            FormattingResult {
                format_needed: true,
                patch: "ignored\n".into(),
                ..FormattingResult::failed("broken", anyhow::anyhow!("x"))
            },
            needs("z", "kept\n"),
        ];
        let mut out = Vec::new();
        let collector = PatchCollector::new(results.into_iter(), &mut out);
        collector.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "kept\n\n");
    }

    #[test]
    fn nothing_to_patch_writes_nothing() {
        let mut out = Vec::new();
        PatchCollector::new(std::iter::empty(), &mut out).finish().unwrap();
        assert!(out.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported_by_finish() {
        let mut out = FailingWriter;
        let collector = PatchCollector::new(vec![needs("a", "p\n")].into_iter(), &mut out);
        assert!(collector.finish().is_err());
    }
}
