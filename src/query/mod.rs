//! Batch execution for the SQL workspace.
//!
//! Splits submitted text into statements, runs them in order against the
//! SQL service and detects statements that change the schema tree.

pub mod ddl;
pub mod orchestrator;
pub mod splitter;

pub use ddl::{detect_ddl, DdlEffect};
pub use orchestrator::{BatchResult, ExecutionOutcome, QueryOrchestrator};
pub use splitter::{split_statements, Statement};
