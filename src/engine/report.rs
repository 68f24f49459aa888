//! Progress lines and run statistics.

use colored::Colorize;
use std::io::{Stderr, Write};

use crate::utils::{pad_to_width, stderr_is_terminal, stderr_width};
use crate::{FormattingResult, RunStats};

/// How one result is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Error,
    Changed,
    Clean,
    Summary,
}

/// Prints one line per result and a summary, collecting [`RunStats`] along the way.
///
/// On an interactive terminal "already clean" lines end in `\r` so the next line overwrites
/// them, and every line is padded to the terminal width to cover what it overwrites.
pub struct Reporter<W: Write> {
    out: W,
    in_place: bool,
    interactive: bool,
    width: usize,
}

impl Reporter<Stderr> {
    /// Reporter on stderr, interactive when stderr is a terminal.
    pub fn stderr(in_place: bool) -> Self {
        let interactive = stderr_is_terminal();
        let width = if interactive {
            stderr_width().unwrap_or(0)
        } else {
            0
        };
        Reporter::new(std::io::stderr(), in_place, interactive, width)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, in_place: bool, interactive: bool, width: usize) -> Self {
        Self {
            out,
            in_place,
            interactive,
            width,
        }
    }

    fn print(&mut self, kind: LineKind, text: &str) {
        let transient = self.interactive && kind == LineKind::Clean;
        let mut line = if self.interactive {
            pad_to_width(text, self.width)
        } else {
            text.to_string()
        };
        if self.interactive {
            line = match kind {
                LineKind::Error => line.red().to_string(),
                LineKind::Changed if self.in_place => line.green().to_string(),
                LineKind::Changed => line.yellow().to_string(),
                LineKind::Clean => line.dimmed().to_string(),
                LineKind::Summary => line.bold().to_string(),
            };
        }
        let end = if transient { "\r" } else { "\n" };
        let _ = write!(self.out, "{}{}", line, end);
        let _ = self.out.flush();
    }

    /// Count one result and print its line.
    pub fn record(&mut self, result: &FormattingResult, stats: &mut RunStats) {
        stats.total += 1;

        if let Some(err) = &result.error {
            stats.errored += 1;
            let verb = if self.in_place { "formatting" } else { "checking" };
            let text = format!("Error {} file '{}': {:#}", verb, result.file_path, err);
            self.print(LineKind::Error, &text);
            return;
        }

        if result.format_needed {
            stats.changed += 1;
            let text = if self.in_place {
                format!("Formatted: '{}'", result.file_path)
            } else {
                format!("Needs formatting: '{}'", result.file_path)
            };
            self.print(LineKind::Changed, &text);
        } else {
            let text = format!("Checked '{}'", result.file_path);
            self.print(LineKind::Clean, &text);
        }
    }

    /// Drain `results`, printing as they arrive, then print the summary.
    pub fn consume<I>(&mut self, results: I) -> RunStats
    where
        I: IntoIterator<Item = FormattingResult>,
    {
        let mut stats = RunStats::default();
        for result in results {
            self.record(&result, &mut stats);
        }
        let summary = if self.in_place {
            format!("{} / {} formatted", stats.changed, stats.total)
        } else {
            format!("{} / {} need formatting", stats.changed, stats.total)
        };
        self.print(LineKind::Summary, &summary);
        stats
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<FormattingResult> {
        vec![
            FormattingResult {
                format_needed: true,
                patch: "p".into(),
                ..FormattingResult::new("a.cpp")
            },
            FormattingResult::new("b.cpp"),
            FormattingResult::failed("c.cpp", anyhow::anyhow!("boom")),
            FormattingResult {
                format_needed: true,
                ..FormattingResult::failed("d.cpp", anyhow::anyhow!("late"))
            },
        ]
    }

    #[test]
    fn counts_total_changed_and_errored() {
        let mut reporter = Reporter::new(Vec::new(), false, false, 0);
        let stats = reporter.consume(results());
        assert_eq!(
            stats,
            RunStats {
                total: 4,
                changed: 1,
                errored: 2
            }
        );
    }

    #[test]
    fn non_interactive_output_keeps_every_line() {
        let mut reporter = Reporter::new(Vec::new(), false, false, 0);
        reporter.consume(results());
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            out,
            "Needs formatting: 'a.cpp'\n\
             Checked 'b.cpp'\n\
             Error checking file 'c.cpp': boom\n\
             Error checking file 'd.cpp': late\n\
             1 / 4 need formatting\n"
        );
    }

    #[test]
    fn in_place_wording() {
        let mut reporter = Reporter::new(Vec::new(), true, false, 0);
        reporter.consume(results().into_iter().take(1));
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "Formatted: 'a.cpp'\n1 / 1 formatted\n");
    }

    #[test]
    fn interactive_clean_lines_are_transient_and_padded() {
        colored::control::set_override(false);
        let mut reporter = Reporter::new(Vec::new(), false, true, 20);
        let mut stats = RunStats::default();
        reporter.record(&FormattingResult::new("b.cpp"), &mut stats);
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "Checked 'b.cpp'     \r");
    }
}
