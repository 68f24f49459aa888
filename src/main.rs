//! Stylize CLI: check (default) or rewrite files with external formatters.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use stylize::engine::arg_parser::Cli;
use stylize::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    std::process::exit(code);
}
