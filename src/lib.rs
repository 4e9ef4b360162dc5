//! sql-workspace - client core for an interactive SQL workspace.
//!
//! Runs `;`-separated statement batches against a remote SQL service and keeps
//! a lazily loaded database -> table -> column tree in sync with them.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod presenter;
pub mod query;
pub mod remote;
pub mod schema;
pub mod workspace;
