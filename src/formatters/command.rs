//! Formatters backed by an external program, and the process runner they share.

use anyhow::{Context, Result, bail};
use log::debug;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{FileRef, Formatter};
use crate::LineRange;
use crate::utils::config::PROCESS_POLL_INTERVAL;

/// Placeholder replaced by the file's absolute path (may appear inside a larger argument).
pub const FILE_PLACEHOLDER: &str = "{file}";
/// Placeholder spliced with the configured extra args.
pub const ARGS_PLACEHOLDER: &str = "{args}";
/// Placeholder spliced with one line-range argument per changed range.
pub const LINES_PLACEHOLDER: &str = "{lines}";

/// A formatter that shells out to `program`.
///
/// `stdin_args` is used for check mode (input on stdin, output on stdout) and
/// `in_place_args` for rewriting; both are templates over the placeholders above.
#[derive(Clone, Debug)]
pub struct CommandFormatter {
    name: String,
    program: String,
    selectors: Vec<String>,
    stdin_args: Vec<String>,
    in_place_args: Vec<String>,
    /// Template for one line range, with `{start}` and `{end}`. `None`: whole-file only.
    line_range_arg: Option<String>,
}

impl CommandFormatter {
    pub fn new(name: &str, program: &str, selectors: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            stdin_args: vec![ARGS_PLACEHOLDER.to_string()],
            in_place_args: vec![ARGS_PLACEHOLDER.to_string(), FILE_PLACEHOLDER.to_string()],
            line_range_arg: None,
        }
    }

    pub fn stdin_args(mut self, args: &[&str]) -> Self {
        self.stdin_args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn in_place_args(mut self, args: &[&str]) -> Self {
        self.in_place_args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn line_range_arg(mut self, template: &str) -> Self {
        self.line_range_arg = Some(template.to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Expand a template into concrete arguments for one invocation.
    fn expand(&self, template: &[String], extra: &[String], file: FileRef<'_>) -> Vec<String> {
        let path = file.path.to_string_lossy();
        let mut out = Vec::with_capacity(template.len() + extra.len());
        for arg in template {
            match arg.as_str() {
                ARGS_PLACEHOLDER => out.extend(extra.iter().cloned()),
                LINES_PLACEHOLDER => out.extend(self.line_args(file.lines)),
                _ => out.push(arg.replace(FILE_PLACEHOLDER, &path)),
            }
        }
        out
    }

    fn line_args(&self, lines: &[LineRange]) -> Vec<String> {
        let Some(template) = &self.line_range_arg else {
            return Vec::new();
        };
        lines
            .iter()
            .map(|r| {
                template
                    .replace("{start}", &r.start.to_string())
                    .replace("{end}", &r.end.to_string())
            })
            .collect()
    }
}

impl Formatter for CommandFormatter {
    fn name(&self) -> &str {
        &self.name
    }

    fn selectors(&self) -> Vec<String> {
        self.selectors.clone()
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    fn format_to_buffer(&self, args: &[String], file: FileRef<'_>, input: &[u8]) -> Result<Vec<u8>> {
        let argv = self.expand(&self.stdin_args, args, file);
        run_io_command(&self.program, &argv, file.path.parent(), Some(input), file.timeout)
    }

    fn format_in_place(&self, args: &[String], file: FileRef<'_>) -> Result<()> {
        let argv = self.expand(&self.in_place_args, args, file);
        run_io_command(&self.program, &argv, file.path.parent(), None, file.timeout)?;
        Ok(())
    }
}

/// Run `program args...` in `cwd`, feed it `input` on stdin (or nothing), and return stdout.
///
/// A non-zero exit is an error carrying the command line and stderr. With a `timeout` the
/// process is killed once it has run that long.
pub fn run_io_command(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    input: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    let command_line = || format!("{} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Own process group, so a timeout also reaches helpers that inherited our pipes.
        cmd.process_group(0);
    }
    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to start '{}'", program))?;

    let stdin = child.stdin.take();
    let mut stdout = child.stdout.take().context("child stdout not captured")?;
    let mut stderr = child.stderr.take().context("child stderr not captured")?;

    let started = Instant::now();
    let (status, out, err) = thread::scope(|s| -> Result<_> {
        // Feed stdin and drain both pipes concurrently so a chatty child cannot deadlock us.
        if let (Some(mut pipe), Some(bytes)) = (stdin, input) {
            s.spawn(move || {
                if let Err(e) = pipe.write_all(bytes) {
                    debug!("writing stdin of '{}': {}", program, e);
                }
            });
        }
        let out_reader = s.spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });
        let err_reader = s.spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).map(|_| buf)
        });

        let status = loop {
            if let Some(status) = child.try_wait().context("wait for formatter")? {
                break status;
            }
            if let Some(limit) = timeout
                && started.elapsed() >= limit
            {
                kill_process_group(&mut child);
                let _ = child.wait();
                bail!("'{}' timed out after {:?}", command_line(), limit);
            }
            thread::sleep(PROCESS_POLL_INTERVAL);
        };

        let out = out_reader
            .join()
            .map_err(|_| anyhow::anyhow!("stdout reader panicked"))?
            .context("read formatter stdout")?;
        let err = err_reader
            .join()
            .map_err(|_| anyhow::anyhow!("stderr reader panicked"))?
            .context("read formatter stderr")?;
        Ok((status, out, err))
    })?;

    if !status.success() {
        debug!("Error running command: {}", command_line());
        bail!(
            "'{}' failed ({}): {}",
            command_line(),
            status,
            String::from_utf8_lossy(&err).trim()
        );
    }
    Ok(out)
}

/// Kill the child and everything else in its process group.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file_ref<'a>(path: &'a Path, lines: &'a [LineRange]) -> FileRef<'a> {
        FileRef {
            path,
            lines,
            timeout: None,
        }
    }

    #[test]
    fn expands_file_args_and_lines() {
        let f = CommandFormatter::new("clang", "clang-format", &[".cpp"])
            .stdin_args(&["--assume-filename={file}", "{lines}", "{args}"])
            .line_range_arg("--lines={start}:{end}");
        let path = PathBuf::from("/src/a.cpp");
        let lines = [LineRange { start: 1, end: 4 }, LineRange { start: 10, end: 10 }];
        let argv = f.expand(&f.stdin_args, &["--style=file".to_string()], file_ref(&path, &lines));
        assert_eq!(
            argv,
            vec![
                "--assume-filename=/src/a.cpp",
                "--lines=1:4",
                "--lines=10:10",
                "--style=file"
            ]
        );
    }

    #[test]
    fn lines_are_dropped_without_a_template() {
        let f = CommandFormatter::new("black", "black", &[".py"]).in_place_args(&["{lines}", "{file}"]);
        let path = PathBuf::from("/src/a.py");
        let lines = [LineRange { start: 1, end: 2 }];
        let argv = f.expand(&f.in_place_args, &[], file_ref(&path, &lines));
        assert_eq!(argv, vec!["/src/a.py"]);
    }

    #[test]
    fn default_templates_put_args_before_file() {
        let f = CommandFormatter::new("rustfmt", "rustfmt", &[".rs"]);
        let path = PathBuf::from("/src/lib.rs");
        let argv = f.expand(&f.in_place_args, &["--edition=2021".to_string()], file_ref(&path, &[]));
        assert_eq!(argv, vec!["--edition=2021", "/src/lib.rs"]);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let f = CommandFormatter::new("nope", "stylize-no-such-program-xyz", &[".x"]);
        assert!(!f.is_available());
        assert!(run_io_command("stylize-no-such-program-xyz", &[], None, None, None).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn pipes_stdin_through_the_program() {
        let out = run_io_command(
            "tr",
            &["a-z".to_string(), "A-Z".to_string()],
            None,
            Some(b"hello\n"),
            None,
        )
        .unwrap();
        assert_eq!(out, b"HELLO\n");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_error_with_stderr() {
        let err = run_io_command(
            "sh",
            &["-c".to_string(), "echo broken >&2; exit 3".to_string()],
            None,
            None,
            None,
        )
        .unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("broken"), "{msg}");
    }

    #[cfg(unix)]
    #[test]
    fn slow_program_is_killed_after_timeout() {
        let started = Instant::now();
        let err = run_io_command(
            "sleep",
            &["5".to_string()],
            None,
            None,
            Some(Duration::from_millis(100)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_also_kills_programs_holding_the_pipes() {
        // The shell's `sleep` child keeps stdout open after the shell itself is gone.
        let started = Instant::now();
        let err = run_io_command(
            "sh",
            &["-c".to_string(), "sleep 3; true".to_string()],
            None,
            None,
            Some(Duration::from_millis(100)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    }
}
