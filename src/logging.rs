//! Logging setup for `sqlws`.
//!
//! Query results are written to stdout, so diagnostics never go there. They
//! go to stderr by default; `--log-file` sends them to a file instead, which
//! keeps both streams clean when the output is piped into other tools.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::error::{Result, WorkspaceError};

/// Filter used when `RUST_LOG` is unset: our own events at info, HTTP stack
/// noise only from warn up.
pub const DEFAULT_DIRECTIVES: &str = "warn,sql_workspace=info";

/// Where diagnostics are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Maps the `--log-file` flag to a target.
    pub fn from_flag(log_file: bool) -> Self {
        if log_file {
            Self::File(log_path())
        } else {
            Self::Stderr
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs the global subscriber for `target`.
pub fn init(target: &LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder.with_writer(file).with_ansi(false).try_init()
        }
    };
    installed.map_err(|e| WorkspaceError::internal(format!("Failed to install logger: {e}")))
}

/// Opens `path` for appending, creating its directory first.
///
/// Appends so that consecutive one-shot invocations share one log.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            WorkspaceError::config(format!(
                "Could not create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            WorkspaceError::config(format!("Could not open log file {}: {e}", path.display()))
        })
}

/// Default log file: the platform state directory, then the config
/// directory, then the temp directory.
pub fn log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("sql-workspace").join("sqlws.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("sqlws.log"))
}
