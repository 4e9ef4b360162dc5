//! Sequential execution of a statement batch.
//!
//! Statements run strictly one after another against the SQL service. The
//! first failure aborts the rest of the batch. Successful CREATE statements
//! are recorded so the schema tree can be refreshed afterwards.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ddl::{detect_ddl, DdlEffect};
use super::splitter::{split_statements, Statement};
use crate::error::{WorkspaceError, SERVICE_UNREACHABLE};
use crate::remote::{ExecutePayload, RemoteService};

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The service accepted the statement.
    Success(ExecutePayload),
    /// The service rejected the statement or could not be reached.
    Failure(WorkspaceError),
}

/// Result of one submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    /// Payload of the last statement that succeeded.
    pub last_result: Option<ExecutePayload>,

    /// Error that aborted the batch, if any.
    pub error: Option<WorkspaceError>,

    /// Name captured from the last recognised `CREATE DATABASE <name>`.
    pub database_created: Option<String>,

    /// Database prefix captured from the last `CREATE TABLE <db>.<table>`.
    pub table_created: Option<String>,

    /// An unqualified `CREATE TABLE <table>` succeeded.
    pub unqualified_table_created: bool,

    /// Number of statements the batch was split into.
    pub total: usize,

    /// Number of statements that succeeded.
    pub succeeded: usize,
}

impl BatchResult {
    /// Returns true if no statement failed.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns true if any statement changed the schema tree.
    pub fn touches_schema(&self) -> bool {
        self.database_created.is_some()
            || self.table_created.is_some()
            || self.unqualified_table_created
    }

    fn record_ddl(&mut self, effect: DdlEffect) {
        match effect {
            DdlEffect::DatabaseCreated { name: Some(name) } => self.database_created = Some(name),
            DdlEffect::DatabaseCreated { name: None } => {}
            DdlEffect::TableCreated { database: Some(db) } => self.table_created = Some(db),
            DdlEffect::TableCreated { database: None } => self.unqualified_table_created = true,
        }
    }
}

/// Runs statement batches against the SQL service.
#[derive(Clone)]
pub struct QueryOrchestrator {
    remote: Arc<dyn RemoteService>,
}

impl QueryOrchestrator {
    /// Creates an orchestrator bound to a service.
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    /// Runs a single statement, tagging the response.
    ///
    /// Transport failures are collapsed into one generic connectivity error;
    /// the underlying cause is only logged.
    pub async fn run_statement(&self, statement: &Statement) -> ExecutionOutcome {
        debug!(sql = %statement, "Executing statement");
        match self.remote.execute(statement.as_str()).await {
            Ok(payload) => ExecutionOutcome::Success(payload),
            Err(WorkspaceError::Transport(cause)) => {
                warn!(%cause, "SQL service unreachable");
                ExecutionOutcome::Failure(WorkspaceError::transport(SERVICE_UNREACHABLE))
            }
            Err(err) => ExecutionOutcome::Failure(err),
        }
    }

    /// Splits `raw_text` and executes the statements in order.
    ///
    /// Stops at the first failure; `last_result` then holds the payload of
    /// the statement before it (or nothing if the first one failed).
    pub async fn execute(&self, raw_text: &str) -> BatchResult {
        let statements = split_statements(raw_text);
        let mut batch = BatchResult {
            total: statements.len(),
            ..BatchResult::default()
        };

        for (index, statement) in statements.iter().enumerate() {
            match self.run_statement(statement).await {
                ExecutionOutcome::Success(payload) => {
                    batch.last_result = Some(payload);
                    batch.succeeded += 1;
                    if let Some(effect) = detect_ddl(statement.as_str()) {
                        debug!(?effect, "Schema-changing statement");
                        batch.record_ddl(effect);
                    }
                }
                ExecutionOutcome::Failure(err) => {
                    warn!(
                        statement = index + 1,
                        total = batch.total,
                        error = %err,
                        "Batch aborted"
                    );
                    batch.error = Some(err);
                    break;
                }
            }
        }

        batch
    }
}
