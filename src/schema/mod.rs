//! Schema tree for the SQL workspace.
//!
//! Databases, their tables and a table's columns, loaded on demand from the
//! SQL service and owned exclusively by [`SchemaCache`].

mod cache;
mod state;

pub use cache::{ColumnSlot, SchemaCache, SchemaSnapshot};
pub use state::{ExpansionState, LoadState, TableRef};
