//! Built-in formatters, in registration order.
//!
//! Order matters for auto-discovery: when two installed formatters claim the same selector
//! the earlier one wins (clang over uncrustify for C/C++, black over yapf for Python).

use std::sync::Arc;

use super::yaml::YamlFormatter;
use super::{CommandFormatter, Formatter};

/// Every built-in formatter, sorted by name.
pub fn builtin_formatters() -> Vec<Arc<dyn Formatter>> {
    let mut all: Vec<Arc<dyn Formatter>> = command_formatters()
        .into_iter()
        .map(|f| Arc::new(f) as Arc<dyn Formatter>)
        .collect();
    all.push(Arc::new(YamlFormatter));
    all.sort_by(|a, b| a.name().cmp(b.name()));
    all
}

/// The formatters that shell out to an external program.
pub fn command_formatters() -> Vec<CommandFormatter> {
    vec![
        // https://github.com/psf/black
        CommandFormatter::new("black", "black", &[".py"])
            .stdin_args(&["-q", "{args}", "-"])
            .in_place_args(&["-q", "{args}", "{file}"]),
        CommandFormatter::new(
            "buildifier",
            "buildifier",
            &[".BUILD", ".bzl", "WORKSPACE", "BUILD"],
        )
        .in_place_args(&["{args}", "{file}"]),
        CommandFormatter::new(
            "clang",
            "clang-format",
            &[".h", ".hpp", ".c", ".cc", ".cpp", ".cxx", ".hxx", ".proto", ".java"],
        )
        .stdin_args(&["--assume-filename={file}", "{lines}", "{args}"])
        .in_place_args(&["-i", "{lines}", "{args}", "{file}"])
        .line_range_arg("--lines={start}:{end}"),
        // gofmt ignores extra args; it has no style knobs worth passing.
        CommandFormatter::new("gofmt", "gofmt", &[".go"])
            .stdin_args(&[])
            .in_place_args(&["-l", "-w", "{file}"]),
        // https://github.com/prettier/prettier
        CommandFormatter::new(
            "prettier",
            "prettier",
            &[".md", ".json", ".css", ".scss", ".less", ".ts"],
        )
        .stdin_args(&["--stdin-filepath", "{file}", "{args}"])
        .in_place_args(&["--write", "{args}", "{file}"]),
        CommandFormatter::new("rustfmt", "rustfmt", &[".rs"]),
        CommandFormatter::new("uncrustify", "uncrustify", &[".h", ".hpp", ".c", ".cc", ".cpp"])
            .stdin_args(&["-q", "{args}"])
            .in_place_args(&["-q", "--no-backup", "{args}", "{file}"]),
        CommandFormatter::new("yapf", "yapf", &[".py"])
            .stdin_args(&["{lines}", "{args}"])
            .in_place_args(&["-i", "{lines}", "{args}", "{file}"])
            .line_range_arg("--lines={start}-{end}"),
    ]
}
