//! Shared fixtures: an in-process formatter and helpers for scratch trees.

#![allow(dead_code)]

use anyhow::{Result, bail};
use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use stylize::engine::Reporter;
use stylize::formatters::{FileRef, Formatter, FormatterMap};

/// Strips trailing whitespace from every line of `.txt` files. Records how many
/// invocations overlap and when each one ran.
#[derive(Default)]
pub struct TrimFormatter {
    pub delay: Duration,
    /// Vary the delay per file so completion order differs from dispatch order.
    pub jitter: bool,
    /// Files whose name contains this fail.
    pub fail_on: Option<&'static str>,
    /// Files whose name contains this make the formatter panic.
    pub panic_on: Option<&'static str>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
    pub windows: Mutex<Vec<(Instant, Instant)>>,
}

pub fn trim(input: &str) -> String {
    input
        .lines()
        .map(|l| format!("{}\n", l.trim_end()))
        .collect()
}

impl TrimFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn instrumented<T>(&self, path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let mut delay = self.delay;
        if self.jitter {
            let salt = name.bytes().map(u64::from).sum::<u64>() % 7;
            delay += Duration::from_millis(salt * 3);
        }
        thread::sleep(delay);

        let result = if self.fail_on.is_some_and(|s| name.contains(s)) {
            Err(anyhow::anyhow!("cannot parse {}", name))
        } else {
            if self.panic_on.is_some_and(|s| name.contains(s)) {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("formatter blew up on {}", name);
            }
            f()
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Ok(mut w) = self.windows.lock() {
            w.push((start, Instant::now()));
        }
        result
    }
}

impl Formatter for TrimFormatter {
    fn name(&self) -> &str {
        "trim"
    }

    fn selectors(&self) -> Vec<String> {
        vec![".txt".to_string()]
    }

    fn is_available(&self) -> bool {
        true
    }

    fn format_to_buffer(&self, _args: &[String], file: FileRef<'_>, input: &[u8]) -> Result<Vec<u8>> {
        self.instrumented(file.path, || {
            let Ok(text) = std::str::from_utf8(input) else {
                bail!("not utf-8");
            };
            Ok(trim(text).into_bytes())
        })
    }

    fn format_in_place(&self, _args: &[String], file: FileRef<'_>) -> Result<()> {
        self.instrumented(file.path, || {
            let text = fs::read_to_string(file.path)?;
            let formatted = trim(&text);
            if formatted != text {
                fs::write(file.path, formatted)?;
            }
            Ok(())
        })
    }
}

pub fn formatter_map(f: &Arc<TrimFormatter>) -> FormatterMap {
    let f: Arc<dyn Formatter> = f.clone();
    FormatterMap::from([(".txt".to_string(), f)])
}

/// Write `content` to `root/rel` and backdate its mtime, so an in-place rewrite in the same
/// clock tick still shows up as a later modification.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    let past = SystemTime::now() - Duration::from_secs(10);
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(past)
        .unwrap();
}

/// Reporter writing plain lines into memory.
pub fn quiet_reporter(in_place: bool) -> Reporter<Vec<u8>> {
    Reporter::new(Vec::new(), in_place, false, 0)
}
