//! Per-node load state and expansion state of the schema tree.

/// Lifecycle of one lazily loaded node.
///
/// `NotLoaded -> Loading -> Loaded | LoadFailed`. Only invalidation returns a
/// node to `NotLoaded`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(T),
    LoadFailed,
}

impl<T> LoadState<T> {
    /// Returns true while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the loaded data, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

impl<T: Default + Clone> LoadState<T> {
    /// Data for display: failures and pending loads show as empty.
    pub fn display_data(&self) -> T {
        self.data().cloned().unwrap_or_default()
    }
}

/// A table addressed by its owning database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub database: String,
    pub table: String,
}

impl TableRef {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }
}

/// Which database is expanded and which table's columns are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionState {
    /// At most one expanded database.
    pub database: Option<String>,
    /// At most one table whose columns are shown.
    pub table: Option<TableRef>,
}

impl ExpansionState {
    /// Toggles `name`: collapses it if expanded, otherwise expands it and
    /// collapses whichever sibling was open.
    ///
    /// A displayed table stays only while its database remains expanded.
    pub fn toggled(&self, name: &str) -> Self {
        let database = if self.database.as_deref() == Some(name) {
            None
        } else {
            Some(name.to_string())
        };
        let table = self
            .table
            .clone()
            .filter(|t| database.as_deref() == Some(t.database.as_str()));
        Self { database, table }
    }

    /// Shows the columns of `table`, expanding its database if another one
    /// was open.
    pub fn with_table(&self, table: TableRef) -> Self {
        Self {
            database: Some(table.database.clone()),
            table: Some(table),
        }
    }

    /// Forgets everything that belongs to `db`.
    pub fn without_database(&self, db: &str) -> Self {
        Self {
            database: self.database.clone().filter(|d| d != db),
            table: self.table.clone().filter(|t| t.database != db),
        }
    }
}
