//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            PackagePaths {
                config_filename: format!(".{}.toml", env!("CARGO_PKG_NAME")),
            }
        })
    }

    /// Config file looked up in the target directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Walk ----

/// Version-control metadata directories. Never descended into, whatever the exclude list says.
pub const VCS_METADATA_DIRS: [&str; 4] = [".git", ".hg", ".svn", ".bzr"];

// ---- Workers ----

/// Formatter invocations in flight when neither CLI nor config says otherwise.
pub const DEFAULT_PARALLELISM: usize = 8;

/// Capacity of the task and result channels. Small on purpose: the file source only needs
/// to stay a little ahead of the workers.
pub const PIPELINE_CHANNEL_CAP: usize = 256;

// ---- External processes ----

/// How often a worker polls a formatter process that runs under a timeout.
pub const PROCESS_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Patch context lines on each side of a change.
pub const PATCH_CONTEXT_LINES: usize = 3;
