//! Mock SQL service for testing.
//!
//! Keeps an in-memory catalog, records every request it receives and lets
//! tests script per-statement answers, simulate an unreachable service, and
//! hold table-list fetches open to observe in-flight state.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Semaphore;

use super::{ColumnMeta, ExecutePayload, RemoteService};
use crate::error::{Result, WorkspaceError};
use crate::query::{detect_ddl, DdlEffect};

/// A request observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Execute(String),
    ListDatabases,
    ListTables(String),
    ListColumns(String, String),
    DropDatabase(String),
    ListBackups(String, String),
    RestoreBackup(String, String, String),
}

#[derive(Default)]
struct MockState {
    /// database -> table -> columns
    catalog: BTreeMap<String, BTreeMap<String, Vec<ColumnMeta>>>,
    backups: HashMap<(String, String), Vec<String>>,
    scripted: HashMap<String, Result<ExecutePayload>>,
    failing_tables: HashMap<String, WorkspaceError>,
    unreachable: bool,
    table_gate: Option<Arc<Semaphore>>,
    calls: Vec<RemoteCall>,
}

/// In-memory stand-in for the SQL service.
#[derive(Default)]
pub struct MockRemoteService {
    state: Mutex<MockState>,
}

impl MockRemoteService {
    /// Creates a mock with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a database with the given tables (no columns).
    pub fn with_database(self, db: &str, tables: &[&str]) -> Self {
        {
            let mut state = self.lock();
            let entry = state.catalog.entry(db.to_string()).or_default();
            for table in tables {
                entry.entry(table.to_string()).or_default();
            }
        }
        self
    }

    /// Sets the columns of a table, creating database and table if needed.
    pub fn with_columns(self, db: &str, table: &str, columns: Vec<ColumnMeta>) -> Self {
        self.lock()
            .catalog
            .entry(db.to_string())
            .or_default()
            .insert(table.to_string(), columns);
        self
    }

    /// Registers backup files for a table.
    pub fn with_backups(self, db: &str, table: &str, files: &[&str]) -> Self {
        self.lock().backups.insert(
            (db.to_string(), table.to_string()),
            files.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// Scripts the answer to one exact statement text.
    pub fn script(&self, statement: &str, answer: Result<ExecutePayload>) {
        self.lock().scripted.insert(statement.to_string(), answer);
    }

    /// Makes `/tables?db=<db>` fail with the given error.
    pub fn fail_tables(&self, db: &str, error: WorkspaceError) {
        self.lock().failing_tables.insert(db.to_string(), error);
    }

    /// Makes every request fail as if the service were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Holds table-list fetches until permits are added to the returned gate.
    pub fn hold_table_fetches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.lock().table_gate = Some(Arc::clone(&gate));
        gate
    }

    /// Returns every request received so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// Counts requests equal to `call`.
    pub fn count(&self, call: &RemoteCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Returns the statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RemoteCall::Execute(sql) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Records the call and fails when the service is marked unreachable.
    fn record(&self, call: RemoteCall) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.unreachable {
            return Err(WorkspaceError::transport("connection refused"));
        }
        Ok(())
    }

    /// Applies the effect of a recognised CREATE statement to the catalog.
    fn apply_ddl(state: &mut MockState, statement: &str) {
        match detect_ddl(statement) {
            Some(DdlEffect::DatabaseCreated { name: Some(name) }) => {
                state.catalog.entry(name).or_default();
            }
            Some(DdlEffect::TableCreated { database: Some(db) }) => {
                let table = statement
                    .split_whitespace()
                    .nth(2)
                    .and_then(|qualified| qualified.split_once('.'))
                    .map(|(_, rest)| {
                        rest.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                            .next()
                            .unwrap_or_default()
                            .to_string()
                    })
                    .unwrap_or_default();
                state.catalog.entry(db).or_default().entry(table).or_default();
            }
            _ => {}
        }
    }
}

#[async_trait]
impl RemoteService for MockRemoteService {
    async fn execute(&self, statement: &str) -> Result<ExecutePayload> {
        self.record(RemoteCall::Execute(statement.to_string()))?;
        let mut state = self.lock();

        if let Some(answer) = state.scripted.get(statement).cloned() {
            if answer.is_ok() {
                Self::apply_ddl(&mut state, statement);
            }
            return answer;
        }

        if statement.to_uppercase().starts_with("SELECT") {
            return Ok(ExecutePayload::new(json!({
                "columns": ["result"],
                "rows": [{ "result": format!("Mock result for: {statement}") }],
                "rows_affected": 1,
                "execution_time": 0.001
            })));
        }

        Self::apply_ddl(&mut state, statement);
        Ok(ExecutePayload::new(json!({
            "message": format!("Executed: {statement}"),
            "rows_affected": 0,
            "execution_time": 0.001
        })))
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        self.record(RemoteCall::ListDatabases)?;
        Ok(self.lock().catalog.keys().cloned().collect())
    }

    async fn list_tables(&self, db: &str) -> Result<Vec<String>> {
        self.record(RemoteCall::ListTables(db.to_string()))?;

        let gate = self.lock().table_gate.clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let state = self.lock();
        if let Some(err) = state.failing_tables.get(db) {
            return Err(err.clone());
        }
        state
            .catalog
            .get(db)
            .map(|tables| tables.keys().cloned().collect())
            .ok_or_else(|| WorkspaceError::schema_load(format!("database {db} does not exist")))
    }

    async fn list_columns(&self, db: &str, table: &str) -> Result<Vec<ColumnMeta>> {
        self.record(RemoteCall::ListColumns(db.to_string(), table.to_string()))?;
        self.lock()
            .catalog
            .get(db)
            .and_then(|tables| tables.get(table))
            .cloned()
            .ok_or_else(|| WorkspaceError::schema_load("table not found"))
    }

    async fn drop_database(&self, db: &str) -> Result<ExecutePayload> {
        self.record(RemoteCall::DropDatabase(db.to_string()))?;
        match self.lock().catalog.remove(db) {
            Some(_) => Ok(ExecutePayload::message_only(format!("Database {db} dropped"))),
            None => Err(WorkspaceError::statement(format!(
                "database {db} does not exist"
            ))),
        }
    }

    async fn list_backups(&self, db: &str, table: &str) -> Result<Vec<String>> {
        self.record(RemoteCall::ListBackups(db.to_string(), table.to_string()))?;
        Ok(self
            .lock()
            .backups
            .get(&(db.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn restore_backup(
        &self,
        db: &str,
        table: &str,
        backup_file: &str,
    ) -> Result<ExecutePayload> {
        self.record(RemoteCall::RestoreBackup(
            db.to_string(),
            table.to_string(),
            backup_file.to_string(),
        ))?;
        let known = self
            .lock()
            .backups
            .get(&(db.to_string(), table.to_string()))
            .is_some_and(|files| files.iter().any(|f| f == backup_file));
        if known {
            Ok(ExecutePayload::message_only(format!(
                "Backup restored for {table} in {db}"
            )))
        } else {
            Err(WorkspaceError::statement("backup not found"))
        }
    }
}
