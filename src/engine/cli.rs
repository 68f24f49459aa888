//! CLI command handler: check by default; --in-place rewrites files.

use anyhow::{Result, bail};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::report::Reporter;
use crate::engine::tools::absolute_dir;
use crate::formatters::registry::describe;
use crate::formatters::{FormatterMap, FormatterRegistry};
use crate::utils::{apply_file_to_ctx, load_stylize_toml, setup_logging};
use crate::{PatchOutput, RunContext, run_with_formatters};

/// Build the run context: defaults, then the config file, then command-line flags.
fn setup_ctx(cli: &Cli) -> Result<RunContext> {
    let root = absolute_dir(&cli.dir)?;
    let mut ctx = RunContext::new(root.clone());

    if let Some(file) = load_stylize_toml(&root, cli.config.as_deref())? {
        apply_file_to_ctx(&file, &mut ctx);
    }

    ctx.exclude.extend(cli.exclude.iter().cloned());
    ctx.in_place = cli.in_place;
    ctx.git_diffbase = cli.git_diffbase.clone();
    ctx.lines |= cli.lines;
    ctx.patch_output = cli.patch_output.as_deref().map(PatchOutput::parse);
    if let Some(n) = cli.parallelism {
        ctx.parallelism = n;
    }
    if let Some(secs) = cli.timeout {
        ctx.timeout = Some(Duration::from_secs(secs));
    }
    if ctx.lines && ctx.git_diffbase.is_none() {
        debug!("--lines has no effect without --git-diffbase");
    }
    Ok(ctx)
}

/// Ctrl+C stops the file source; files already handed to a formatter still finish.
fn install_interrupt_handler(ctx: &mut RunContext) {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    match ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        Ok(()) => ctx.cancel = Some(flag),
        Err(e) => warn!("Could not install Ctrl+C handler: {}", e),
    }
}

fn print_formatters(formatters: &FormatterMap) {
    for (selector, name) in describe(formatters) {
        eprintln!("{} -> {}", selector, name);
    }
}

/// Run check or in-place mode and return the process exit code
/// (0 clean, 1 errors, 2 check mode found files to format).
pub fn handle_run(cli: &Cli) -> Result<i32> {
    setup_logging(cli.verbose);
    let mut ctx = setup_ctx(cli)?;

    let registry = FormatterRegistry::with_builtins()?;
    let formatters = registry.resolve(ctx.formatters_by_ext.as_ref())?;
    if cli.print_formatters {
        print_formatters(&formatters);
        return Ok(0);
    }
    if formatters.is_empty() {
        warn!("No formatters available; nothing will be checked.");
    }
    if ctx.in_place {
        debug!("Formatting in place...");
    }

    install_interrupt_handler(&mut ctx);
    let mut reporter = Reporter::stderr(ctx.in_place);
    let stats = run_with_formatters(&ctx, &formatters, &mut reporter)?;

    if ctx.is_cancelled() {
        bail!("interrupted after {} files", stats.total);
    }
    Ok(stats.exit_code(ctx.in_place))
}
