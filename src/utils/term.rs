//! Terminal detection for the progress reporter.

use console::{Alignment, Term};

/// True when stderr is attached to a terminal.
pub fn stderr_is_terminal() -> bool {
    Term::stderr().is_term()
}

/// Column count of the terminal behind stderr, or `None` if it cannot be determined.
pub fn stderr_width() -> Option<usize> {
    Term::stderr()
        .size_checked()
        .map(|(_rows, cols)| cols as usize)
        .filter(|&cols| cols > 0)
}

/// Right-pad `text` with spaces to `width` display columns. Escape sequences take no
/// columns. Longer text is returned unchanged.
pub fn pad_to_width(text: &str, width: usize) -> String {
    console::pad_str(text, width, Alignment::Left, None).into_owned()
}
