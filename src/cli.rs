//! Command-line argument parsing for `sqlws`.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::error::{Result, WorkspaceError};

/// Interactive SQL workspace client.
#[derive(Parser, Debug)]
#[command(name = "sqlws")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL service base URL (e.g., http://127.0.0.1:5000)
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Use named service from config
    #[arg(short = 's', long, value_name = "NAME", global = true)]
    pub service: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to the state directory instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one or more `;`-separated statements
    Run {
        /// SQL text (use "-" to read stdin)
        #[arg(value_name = "SQL", conflicts_with = "file")]
        sql: Option<String>,

        /// Read SQL from a file
        #[arg(short = 'f', long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// List databases
    Databases,
    /// List the tables of a database
    Tables { db: String },
    /// List the columns of a table
    Columns { db: String, table: String },
    /// Drop a database
    DropDatabase { db: String },
    /// List the backup files of a table
    Backups { db: String, table: String },
    /// Restore a table from a backup file
    Restore {
        db: String,
        table: String,
        backup_file: String,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, using the default if not specified.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}

/// Resolves the SQL text of a `run` command.
pub fn read_sql(sql: Option<&str>, file: Option<&PathBuf>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path).map_err(|e| {
            WorkspaceError::config(format!("Failed to read {}: {e}", path.display()))
        });
    }

    match sql {
        Some("-") | None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| WorkspaceError::internal(format!("Failed to read stdin: {e}")))?;
            Ok(buffer)
        }
        Some(text) => Ok(text.to_string()),
    }
}
