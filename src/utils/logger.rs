use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

const LOG_ENV: &str = "RUST_LOG";

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "error".red().bold(),
        Level::Warn => "warn".yellow(),
        Level::Info => "info".green(),
        Level::Debug => "debug".blue(),
        Level::Trace => "trace".dimmed(),
    }
}

/// `stylize <level>: message`, with the emitting module appended when `show_target` is set.
/// Debug and trace messages are dimmed.
pub(crate) fn render_line(level: Level, target: &str, message: &str, show_target: bool) -> String {
    let body = match level {
        Level::Debug | Level::Trace => message.dimmed().to_string(),
        _ => message.to_string(),
    };
    let mut line = format!("{} {}: {}", env!("CARGO_PKG_NAME").cyan(), level_tag(level), body);
    if show_target {
        line.push_str(&format!(" ({})", target.white()));
    }
    line
}

/// Install the global logger. When `RUST_LOG` is set it alone decides the filter; otherwise
/// dependencies log at Warn and this crate at Info (Debug and module targets when `verbose`).
pub fn setup_logging(verbose: bool) {
    let mut builder = if std::env::var_os(LOG_ENV).is_some() {
        Builder::from_env(LOG_ENV)
    } else {
        let mut b = Builder::new();
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        b.filter_level(LevelFilter::Warn)
            .filter_module(env!("CARGO_CRATE_NAME"), level);
        b
    };

    builder.format(move |buf, record| {
        let line = render_line(
            record.level(),
            record.target(),
            &record.args().to_string(),
            verbose || record.level() == Level::Error,
        );
        writeln!(buf, "{}", line)
    });
    // A second call (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}
