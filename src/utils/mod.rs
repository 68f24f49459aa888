pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod stylize_toml;
pub mod term;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, effective_parallelism, max_open_fds, max_workers_by_fd_limit};
pub use logger::setup_logging;
pub use stylize_toml::{StylizeToml, apply_file_to_ctx, load_stylize_toml};
pub use term::{pad_to_width, stderr_is_terminal, stderr_width};
