//! The SQL workspace: batch execution wired to the schema tree.
//!
//! The orchestrator never touches the tree; it reports what a batch created
//! and the workspace turns that into cache refreshes.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::presenter::{classify, Presentation};
use crate::query::{BatchResult, QueryOrchestrator};
use crate::remote::{ColumnMeta, ExecutePayload, RemoteService};
use crate::schema::{SchemaCache, TableRef};

/// Schema refresh requested after a batch.
///
/// The database list is refreshed once; each named database then has its
/// table list reloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSignal {
    /// Databases whose table lists must be reloaded, without duplicates.
    pub databases: Vec<String>,
}

impl CacheSignal {
    /// Derives the refresh a batch calls for.
    ///
    /// Created databases and created tables are independent signals. An
    /// unqualified `CREATE TABLE` falls back to the currently selected
    /// database and is dropped when nothing is selected.
    pub fn from_batch(batch: &BatchResult, selected_database: Option<&str>) -> Option<Self> {
        let unqualified = selected_database.filter(|_| batch.unqualified_table_created);
        let mut databases: Vec<String> = Vec::new();
        for db in [
            batch.database_created.as_deref(),
            batch.table_created.as_deref(),
            unqualified,
        ]
        .into_iter()
        .flatten()
        {
            if !databases.iter().any(|d| d == db) {
                databases.push(db.to_string());
            }
        }

        if databases.is_empty() {
            None
        } else {
            Some(Self { databases })
        }
    }
}

/// A submitted batch and how to show its result.
#[derive(Debug, Clone)]
pub struct Submission {
    pub batch: BatchResult,
    pub presentation: Option<Presentation>,
}

/// Client-side state of one workspace session.
pub struct Workspace {
    remote: Arc<dyn RemoteService>,
    orchestrator: QueryOrchestrator,
    cache: SchemaCache,
}

impl Workspace {
    /// Creates a workspace bound to a service.
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self {
            orchestrator: QueryOrchestrator::new(Arc::clone(&remote)),
            cache: SchemaCache::new(Arc::clone(&remote)),
            remote,
        }
    }

    /// Loads the database list, as on first display.
    pub async fn mount(&self) -> Vec<String> {
        self.cache.list_databases().await
    }

    /// Read access to the schema tree.
    pub fn schema(&self) -> &SchemaCache {
        &self.cache
    }

    /// Database of the table whose columns are displayed.
    pub fn selected_database(&self) -> Option<String> {
        self.cache.expansion().table.map(|t| t.database)
    }

    /// Runs a batch, refreshes the schema if it created anything, and
    /// classifies the last successful payload.
    pub async fn submit(&self, raw_text: &str) -> Submission {
        let batch = self.orchestrator.execute(raw_text).await;

        let selected = self.selected_database();
        if let Some(signal) = CacheSignal::from_batch(&batch, selected.as_deref()) {
            info!(databases = ?signal.databases, "Batch changed the schema");
            self.cache.list_databases().await;
            for db in &signal.databases {
                self.cache.reload_tables(db).await;
            }
        }

        let presentation = batch.last_result.as_ref().map(classify);
        Submission {
            batch,
            presentation,
        }
    }

    /// Toggles a database and loads its tables when it opens.
    pub async fn expand_database(&self, name: &str) -> Option<Vec<String>> {
        match self.cache.expand_database(name) {
            Some(db) => Some(self.cache.get_tables(&db).await),
            None => None,
        }
    }

    /// Shows the columns of a table.
    pub async fn select_table(&self, db: &str, table: &str) -> Vec<ColumnMeta> {
        self.cache.get_columns(db, table).await
    }

    /// Explicit user refresh.
    pub async fn refresh(&self, db: Option<&str>) {
        self.cache.refresh(db).await;
    }

    /// Drops a database and removes it from the tree.
    pub async fn drop_database(&self, db: &str) -> Result<ExecutePayload> {
        let payload = self.remote.drop_database(db).await?;
        self.cache.forget_database(db);
        self.cache.list_databases().await;
        Ok(payload)
    }

    /// Lists the backup files of a table.
    pub async fn list_backups(&self, db: &str, table: &str) -> Result<Vec<String>> {
        self.remote.list_backups(db, table).await
    }

    /// Restores a table from a backup file.
    pub async fn restore_backup(
        &self,
        db: &str,
        table: &str,
        backup_file: &str,
    ) -> Result<ExecutePayload> {
        let payload = self.remote.restore_backup(db, table, backup_file).await?;
        self.cache.clear_columns_of(&TableRef::new(db, table));
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkspaceError;
    use crate::remote::{MockRemoteService, RemoteCall};
    use crate::schema::LoadState;
    use pretty_assertions::assert_eq;

    fn setup() -> (Arc<MockRemoteService>, Workspace) {
        let mock = Arc::new(
            MockRemoteService::new()
                .with_database("hr", &["staff"])
                .with_columns("hr", "staff", vec![ColumnMeta::new("id", "INT")]),
        );
        let workspace = Workspace::new(mock.clone());
        (mock, workspace)
    }

    fn signal(databases: &[&str]) -> Option<CacheSignal> {
        Some(CacheSignal {
            databases: databases.iter().map(|d| d.to_string()).collect(),
        })
    }

    #[test]
    fn test_created_database_and_table_are_independent() {
        let batch = BatchResult {
            database_created: Some("a".into()),
            table_created: Some("b".into()),
            ..BatchResult::default()
        };
        assert_eq!(CacheSignal::from_batch(&batch, Some("c")), signal(&["a", "b"]));
    }

    #[test]
    fn test_same_database_is_reloaded_once() {
        let batch = BatchResult {
            database_created: Some("shop".into()),
            table_created: Some("shop".into()),
            unqualified_table_created: true,
            ..BatchResult::default()
        };
        assert_eq!(CacheSignal::from_batch(&batch, Some("shop")), signal(&["shop"]));
    }

    #[test]
    fn test_signal_unqualified_table_needs_selection() {
        let batch = BatchResult {
            unqualified_table_created: true,
            ..BatchResult::default()
        };
        assert_eq!(CacheSignal::from_batch(&batch, None), None);
        assert_eq!(CacheSignal::from_batch(&batch, Some("hr")), signal(&["hr"]));
    }

    #[test]
    fn test_no_signal_without_ddl() {
        assert_eq!(CacheSignal::from_batch(&BatchResult::default(), Some("hr")), None);
    }

    #[tokio::test]
    async fn test_create_database_and_table_refresh_once() {
        let (mock, workspace) = setup();

        let submission = workspace
            .submit("CREATE DATABASE shop; CREATE TABLE shop.orders(id INT)")
            .await;

        assert!(submission.batch.is_success());
        assert_eq!(mock.count(&RemoteCall::ListDatabases), 1);
        assert_eq!(mock.count(&RemoteCall::ListTables("shop".into())), 1);
        assert_eq!(workspace.schema().databases(), vec!["hr", "shop"]);
        assert_eq!(
            workspace.schema().load_state("shop"),
            LoadState::Loaded(vec!["orders".to_string()])
        );
    }

    #[tokio::test]
    async fn test_table_in_other_database_is_reloaded_too() {
        let mock = Arc::new(MockRemoteService::new().with_database("b", &["old"]));
        let workspace = Workspace::new(mock.clone());
        workspace.expand_database("b").await;

        let submission = workspace
            .submit("CREATE DATABASE a; CREATE TABLE b.t(x INT)")
            .await;

        assert!(submission.batch.is_success());
        assert_eq!(mock.count(&RemoteCall::ListDatabases), 1);
        assert_eq!(mock.count(&RemoteCall::ListTables("a".into())), 1);
        assert_eq!(mock.count(&RemoteCall::ListTables("b".into())), 2);
        assert_eq!(
            workspace.schema().load_state("b"),
            LoadState::Loaded(vec!["old".to_string(), "t".to_string()])
        );
        assert_eq!(workspace.schema().databases(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_plain_query_sends_no_signal() {
        let (mock, workspace) = setup();

        let submission = workspace.submit("SELECT 1").await;

        assert_eq!(mock.calls(), vec![RemoteCall::Execute("SELECT 1".into())]);
        assert_eq!(submission.presentation.map(|p| p.kind()), Some("tabular"));
    }

    #[tokio::test]
    async fn test_unqualified_create_table_refreshes_selected_database() {
        let (mock, workspace) = setup();
        workspace.expand_database("hr").await;
        workspace.select_table("hr", "staff").await;

        workspace.submit("CREATE TABLE payroll(id INT)").await;

        assert_eq!(mock.count(&RemoteCall::ListTables("hr".into())), 2);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_prior_result() {
        let (mock, workspace) = setup();
        mock.script("BAD", Err(WorkspaceError::statement("nope")));

        let submission = workspace.submit("SELECT 1; BAD; SELECT 2").await;

        assert_eq!(
            submission.batch.error,
            Some(WorkspaceError::statement("nope"))
        );
        assert_eq!(submission.presentation.map(|p| p.kind()), Some("tabular"));
    }

    #[tokio::test]
    async fn test_expand_loads_tables_once() {
        let (mock, workspace) = setup();

        assert_eq!(
            workspace.expand_database("hr").await,
            Some(vec!["staff".to_string()])
        );
        assert_eq!(workspace.expand_database("hr").await, None);
        workspace.expand_database("hr").await;

        assert_eq!(mock.count(&RemoteCall::ListTables("hr".into())), 1);
    }

    #[tokio::test]
    async fn test_drop_database_prunes_tree() {
        let (_mock, workspace) = setup();
        workspace.mount().await;
        workspace.expand_database("hr").await;

        workspace.drop_database("hr").await.unwrap();

        let snapshot = workspace.schema().snapshot();
        assert!(snapshot.databases.is_empty());
        assert_eq!(snapshot.expansion.database, None);
    }

    #[tokio::test]
    async fn test_restore_clears_column_slot() {
        let mock = Arc::new(
            MockRemoteService::new()
                .with_columns("hr", "staff", vec![ColumnMeta::new("id", "INT")])
                .with_backups("hr", "staff", &["staff_1.json"]),
        );
        let workspace = Workspace::new(mock.clone());
        workspace.select_table("hr", "staff").await;

        workspace
            .restore_backup("hr", "staff", "staff_1.json")
            .await
            .unwrap();

        assert_eq!(workspace.schema().columns(), None);
    }
}
