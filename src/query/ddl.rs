//! Detection of schema-changing statements.
//!
//! Detection is a case-insensitive prefix test on the trimmed statement text
//! followed by a pattern match for the identifiers. Quoted identifiers,
//! leading comments and unusual spacing are not recognised.

use regex::Regex;
use std::sync::OnceLock;

/// Schema change implied by a successfully executed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlEffect {
    /// `CREATE DATABASE <name>`. `name` is `None` when no identifier followed.
    DatabaseCreated { name: Option<String> },
    /// `CREATE TABLE ...`. `database` is set only for `db.table` names.
    TableCreated { database: Option<String> },
}

fn create_database_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)CREATE DATABASE\s+([A-Za-z0-9_]+)").expect("valid regex")
    })
}

fn create_qualified_table_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)CREATE TABLE\s+([A-Za-z0-9_]+)\.([A-Za-z0-9_]+)").expect("valid regex")
    })
}

/// Classifies a statement as a schema change, if it is one.
pub fn detect_ddl(statement: &str) -> Option<DdlEffect> {
    let statement = statement.trim();
    let upper = statement.to_uppercase();

    if upper.starts_with("CREATE DATABASE") {
        let name = create_database_pattern()
            .captures(statement)
            .map(|caps| caps[1].to_string());
        return Some(DdlEffect::DatabaseCreated { name });
    }

    if upper.starts_with("CREATE TABLE") {
        let database = create_qualified_table_pattern()
            .captures(statement)
            .map(|caps| caps[1].to_string());
        return Some(DdlEffect::TableCreated { database });
    }

    None
}
