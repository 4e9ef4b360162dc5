//! Lazily populated database -> table -> column tree.
//!
//! The database list is fetched fresh on every refresh. Table lists are
//! memoized per database until invalidated, and at most one fetch per
//! database is in flight at a time. Columns live in a single slot that is
//! refilled on every table selection. Every listing failure is absorbed into
//! an empty list.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use super::state::{ExpansionState, LoadState, TableRef};
use crate::remote::{ColumnMeta, RemoteService};

type TablesFetch = Shared<BoxFuture<'static, Vec<String>>>;

#[derive(Default)]
struct TableNode {
    state: LoadState<Vec<String>>,
    /// Replaced on invalidation; a fetch only writes back if its epoch is current.
    epoch: u64,
    inflight: Option<TablesFetch>,
}

/// Columns of the currently displayed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub table: TableRef,
    pub state: LoadState<Vec<ColumnMeta>>,
}

#[derive(Default)]
struct SchemaState {
    databases: Vec<String>,
    tables: HashMap<String, TableNode>,
    columns: Option<ColumnSlot>,
    /// Incremented per column request; only the latest request fills the slot.
    column_request: u64,
    /// Last epoch handed out. Epochs are never reused, even after a node is
    /// removed and recreated.
    last_epoch: u64,
    expansion: ExpansionState,
}

impl SchemaState {
    fn next_epoch(&mut self) -> u64 {
        self.last_epoch += 1;
        self.last_epoch
    }

    fn table_node(&mut self, db: &str) -> &mut TableNode {
        let last_epoch = &mut self.last_epoch;
        self.tables.entry(db.to_string()).or_insert_with(|| {
            *last_epoch += 1;
            TableNode {
                epoch: *last_epoch,
                ..TableNode::default()
            }
        })
    }
}

/// Point-in-time copy of the tree, for rendering and assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub databases: Vec<String>,
    pub tables: BTreeMap<String, LoadState<Vec<String>>>,
    pub columns: Option<ColumnSlot>,
    pub expansion: ExpansionState,
}

/// Owner of the schema tree. Cloning yields another handle to the same tree.
#[derive(Clone)]
pub struct SchemaCache {
    remote: Arc<dyn RemoteService>,
    state: Arc<Mutex<SchemaState>>,
}

fn lock(state: &Mutex<SchemaState>) -> MutexGuard<'_, SchemaState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SchemaCache {
    /// Creates an empty cache backed by `remote`.
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self {
            remote,
            state: Arc::new(Mutex::new(SchemaState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchemaState> {
        lock(&self.state)
    }

    /// Fetches the database list from the service and stores it.
    pub async fn list_databases(&self) -> Vec<String> {
        let databases = match self.remote.list_databases().await {
            Ok(databases) => databases,
            Err(e) => {
                warn!(error = %e, "Failed to list databases");
                Vec::new()
            }
        };
        self.lock().databases = databases.clone();
        databases
    }

    /// Returns the last fetched database list.
    pub fn databases(&self) -> Vec<String> {
        self.lock().databases.clone()
    }

    /// Toggles expansion of `name` and returns the expanded database, if any.
    pub fn expand_database(&self, name: &str) -> Option<String> {
        let mut state = self.lock();
        state.expansion = state.expansion.toggled(name);
        if state.expansion.table.is_none() {
            state.columns = None;
        }
        state.expansion.database.clone()
    }

    /// Returns the current expansion state.
    pub fn expansion(&self) -> ExpansionState {
        self.lock().expansion.clone()
    }

    /// Returns the tables of `db`, fetching them on first reference.
    ///
    /// Callers arriving while a fetch is in flight share it. A failed fetch
    /// leaves the node `LoadFailed` and yields an empty list.
    pub async fn get_tables(&self, db: &str) -> Vec<String> {
        let fetch = {
            let mut state = self.lock();
            let node = state.table_node(db);
            match &node.state {
                LoadState::Loaded(tables) => return tables.clone(),
                LoadState::LoadFailed => return Vec::new(),
                LoadState::Loading | LoadState::NotLoaded => {}
            }
            let joined = node.inflight.clone().filter(|_| node.state.is_loading());
            match joined {
                Some(fetch) => {
                    debug!(db, "Joining in-flight table fetch");
                    fetch
                }
                None => self.start_table_fetch(db, node),
            }
        };
        fetch.await
    }

    fn start_table_fetch(&self, db: &str, node: &mut TableNode) -> TablesFetch {
        let epoch = node.epoch;
        let remote = Arc::clone(&self.remote);
        let state = Arc::clone(&self.state);
        let db = db.to_string();

        let fetch = async move {
            debug!(db = %db, "Fetching tables");
            let outcome = remote.list_tables(&db).await;

            let (tables, next) = match outcome {
                Ok(tables) => (tables.clone(), LoadState::Loaded(tables)),
                Err(e) => {
                    warn!(db = %db, error = %e, "Failed to load tables");
                    (Vec::new(), LoadState::LoadFailed)
                }
            };

            let mut guard = lock(&state);
            match guard.tables.get_mut(&db) {
                Some(node) if node.epoch == epoch => {
                    node.state = next;
                    node.inflight = None;
                }
                _ => debug!(db = %db, "Discarding table list from before invalidation"),
            }
            drop(guard);

            tables
        }
        .boxed()
        .shared();

        node.state = LoadState::Loading;
        node.inflight = Some(fetch.clone());
        fetch
    }

    /// Returns the load state of `db`'s table list.
    pub fn load_state(&self, db: &str) -> LoadState<Vec<String>> {
        self.lock()
            .tables
            .get(db)
            .map(|node| node.state.clone())
            .unwrap_or_default()
    }

    /// Forces `db` back to `NotLoaded`; the next `get_tables` re-fetches.
    pub fn invalidate(&self, db: &str) {
        let mut state = self.lock();
        let epoch = state.next_epoch();
        let node = state.table_node(db);
        node.epoch = epoch;
        node.state = LoadState::NotLoaded;
        node.inflight = None;
        info!(db, "Invalidated table list");
    }

    /// Invalidates `db` and fetches its tables again.
    pub async fn reload_tables(&self, db: &str) -> Vec<String> {
        self.invalidate(db);
        self.get_tables(db).await
    }

    /// Refreshes the database list and, if given, reloads one table list.
    pub async fn refresh(&self, db: Option<&str>) {
        info!(db = db.unwrap_or("-"), "Refreshing schema");
        self.list_databases().await;
        if let Some(db) = db {
            self.reload_tables(db).await;
        }
    }

    /// Loads the columns of `db.table` into the column slot and returns them.
    ///
    /// Never memoized: selecting a table always re-fetches. A response for a
    /// selection that has since been replaced is dropped.
    pub async fn get_columns(&self, db: &str, table: &str) -> Vec<ColumnMeta> {
        let table_ref = TableRef::new(db, table);
        let request = {
            let mut state = self.lock();
            state.column_request += 1;
            state.columns = Some(ColumnSlot {
                table: table_ref.clone(),
                state: LoadState::Loading,
            });
            state.expansion = state.expansion.with_table(table_ref.clone());
            state.column_request
        };

        let (columns, next) = match self.remote.list_columns(db, table).await {
            Ok(columns) => (columns.clone(), LoadState::Loaded(columns)),
            Err(e) => {
                warn!(db, table, error = %e, "Failed to load columns");
                (Vec::new(), LoadState::LoadFailed)
            }
        };

        let mut state = self.lock();
        if state.column_request == request {
            state.columns = Some(ColumnSlot {
                table: table_ref,
                state: next,
            });
        }
        columns
    }

    /// Returns the column slot.
    pub fn columns(&self) -> Option<ColumnSlot> {
        self.lock().columns.clone()
    }

    /// Looks up a displayed column by name, for type inspection.
    pub fn column(&self, name: &str) -> Option<ColumnMeta> {
        self.lock()
            .columns
            .as_ref()
            .and_then(|slot| slot.state.data())
            .and_then(|cols| cols.iter().find(|c| c.name == name).cloned())
    }

    /// Empties the column slot if it shows `table`.
    pub fn clear_columns_of(&self, table: &TableRef) {
        let mut state = self.lock();
        if state.columns.as_ref().is_some_and(|slot| &slot.table == table) {
            state.columns = None;
            state.column_request += 1;
        }
    }

    /// Removes every trace of a dropped database.
    pub fn forget_database(&self, db: &str) {
        let mut state = self.lock();
        state.databases.retain(|d| d != db);
        state.tables.remove(db);
        state.expansion = state.expansion.without_database(db);
        if state
            .columns
            .as_ref()
            .is_some_and(|slot| slot.table.database == db)
        {
            state.columns = None;
            state.column_request += 1;
        }
        info!(db, "Forgot dropped database");
    }

    /// Copies the current tree.
    pub fn snapshot(&self) -> SchemaSnapshot {
        let state = self.lock();
        SchemaSnapshot {
            databases: state.databases.clone(),
            tables: state
                .tables
                .iter()
                .map(|(db, node)| (db.clone(), node.state.clone()))
                .collect(),
            columns: state.columns.clone(),
            expansion: state.expansion.clone(),
        }
    }
}
