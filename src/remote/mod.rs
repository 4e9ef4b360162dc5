//! Access layer for the remote SQL service.
//!
//! Provides a trait-based interface so the orchestrator and schema cache can
//! run against the HTTP service or an in-memory double interchangeably.

mod http;
mod mock;
mod types;

pub use http::HttpRemoteService;
pub use mock::{MockRemoteService, RemoteCall};
pub use types::{ColumnMeta, ExecutePayload, CACHE_SOURCE};

use crate::error::Result;
use async_trait::async_trait;

/// Operations offered by the SQL service.
///
/// Every call resolves to `Ok` or to a tagged failure: `WorkspaceError::Transport`
/// when no response was obtained, `WorkspaceError::Statement` when an execution
/// request was rejected, `WorkspaceError::SchemaLoad` when a listing was rejected.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Executes one SQL statement.
    async fn execute(&self, statement: &str) -> Result<ExecutePayload>;

    /// Lists all databases.
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// Lists the tables of a database.
    async fn list_tables(&self, db: &str) -> Result<Vec<String>>;

    /// Lists the columns of a table.
    async fn list_columns(&self, db: &str, table: &str) -> Result<Vec<ColumnMeta>>;

    /// Drops a database and all its tables.
    async fn drop_database(&self, db: &str) -> Result<ExecutePayload>;

    /// Lists backup files recorded for a table.
    async fn list_backups(&self, db: &str, table: &str) -> Result<Vec<String>>;

    /// Restores a table from one of its backup files.
    async fn restore_backup(&self, db: &str, table: &str, backup_file: &str)
        -> Result<ExecutePayload>;
}
