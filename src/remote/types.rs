//! Wire types exchanged with the SQL service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body of a successful `/execute` call.
///
/// Kept as opaque JSON: the service may answer with a result set, a mutation
/// summary, a plain message, or any other shape. Typed accessors cover the
/// fields the presenter cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutePayload(Value);

/// Value of the `source` field marking a server-side cache hit.
pub const CACHE_SOURCE: &str = "cache";

impl ExecutePayload {
    /// Wraps a raw JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Builds a message-only payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self(serde_json::json!({ "message": message.into() }))
    }

    /// Returns the underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the payload, returning the underlying JSON.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns the field if it is present and not null.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Result-set column names, if present as an array.
    pub fn columns(&self) -> Option<Vec<String>> {
        let columns = self.field("columns")?.as_array()?;
        Some(
            columns
                .iter()
                .map(|c| match c {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )
    }

    /// Result-set rows, if present as an array.
    pub fn rows(&self) -> Option<&Vec<Value>> {
        self.field("rows")?.as_array()
    }

    /// Number of rows affected, when reported as a non-negative integer.
    pub fn rows_affected(&self) -> Option<u64> {
        self.field("rows_affected")?.as_u64()
    }

    /// Server-side execution time in seconds.
    pub fn execution_time(&self) -> Option<f64> {
        self.field("execution_time")?.as_f64()
    }

    /// Informational message from the service.
    pub fn message(&self) -> Option<&str> {
        self.field("message")?.as_str()
    }

    /// True when the service marked this response as served from its result cache.
    pub fn is_cache_hit(&self) -> bool {
        self.field("source").and_then(Value::as_str) == Some(CACHE_SOURCE)
    }
}

impl From<Value> for ExecutePayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Column metadata as returned by `/columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,

    /// Declared type string (e.g. `INT`, `VARCHAR(255)`).
    #[serde(rename = "type", default)]
    pub data_type: String,
}

impl ColumnMeta {
    /// Creates column metadata with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExecuteRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DropDatabaseRequest<'a> {
    pub db: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RestoreBackupRequest<'a> {
    pub db: &'a str,
    pub table: &'a str,
    pub backup_file: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatabasesResponse {
    #[serde(default)]
    pub databases: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ColumnsResponse {
    #[serde(default)]
    pub columns: Vec<ColumnMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BackupsResponse {
    #[serde(default)]
    pub backups: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_accessors() {
        let payload = ExecutePayload::new(json!({
            "columns": ["id", "name"],
            "rows": [{"id": 1, "name": "a"}],
            "rows_affected": 1,
            "execution_time": 0.0021,
            "message": "ok",
            "source": "cache"
        }));

        assert_eq!(
            payload.columns(),
            Some(vec!["id".to_string(), "name".to_string()])
        );
        assert_eq!(payload.rows().map(Vec::len), Some(1));
        assert_eq!(payload.rows_affected(), Some(1));
        assert_eq!(payload.execution_time(), Some(0.0021));
        assert_eq!(payload.message(), Some("ok"));
        assert!(payload.is_cache_hit());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let payload = ExecutePayload::new(json!({ "message": null, "rows_affected": null }));
        assert!(payload.field("message").is_none());
        assert!(payload.rows_affected().is_none());
    }

    #[test]
    fn test_non_object_payload() {
        let payload = ExecutePayload::new(json!([1, 2, 3]));
        assert!(payload.columns().is_none());
        assert!(!payload.is_cache_hit());
    }

    #[test]
    fn test_column_meta_wire_name() {
        let col: ColumnMeta = serde_json::from_value(json!({"name": "id", "type": "INT"})).unwrap();
        assert_eq!(col, ColumnMeta::new("id", "INT"));
    }

    #[test]
    fn test_listing_defaults_to_empty() {
        let tables: TablesResponse = serde_json::from_value(json!({})).unwrap();
        assert!(tables.tables.is_empty());
    }
}
