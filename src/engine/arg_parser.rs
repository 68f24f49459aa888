use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Run external code formatters over a directory in parallel.
#[derive(Clone, Parser)]
#[command(name = "stylize")]
#[command(
    about = "Check (default) or rewrite source files with external formatters; optionally only files changed since a git ref."
)]
pub struct Cli {
    /// Directory to format. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Rewrite files in place instead of only checking them.
    #[arg(long, short = 'i')]
    pub in_place: bool,

    /// Write a patch of all needed changes to PATH (`-` for stdout). Check mode only.
    #[arg(long, value_name = "PATH")]
    pub patch_output: Option<String>,

    /// Config file. Default: `.stylize.toml` in DIR, if present.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exclude patterns relative to DIR (glob syntax). Repeat or separate with commas.
    #[arg(long, short = 'e', value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Only consider files that differ from this git ref (e.g. `master`, `HEAD~3`).
    #[arg(long, value_name = "REF")]
    pub git_diffbase: Option<String>,

    /// Max formatter processes running at once.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub parallelism: Option<usize>,

    /// With --git-diffbase, pass changed line ranges to formatters that support them.
    #[arg(long)]
    pub lines: bool,

    /// Kill a formatter process after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Print the extension -> formatter mapping that would be used, then exit.
    #[arg(long)]
    pub print_formatters: bool,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
