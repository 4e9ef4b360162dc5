//! Classification of service responses for display.
//!
//! `classify` is total: every payload maps to exactly one [`Presentation`].
//! Precedence: result set, then mutation summary, then message, then raw.

use std::fmt;

use serde_json::Value;

use crate::remote::ExecutePayload;

/// Display-ready shape of an `/execute` response.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// A result set. Rows are objects keyed by column name, or positional arrays.
    Tabular { columns: Vec<String>, rows: Vec<Value> },
    /// A statement summary without a result set.
    Mutation {
        rows_affected: Option<u64>,
        execution_time_secs: Option<f64>,
        from_cache: bool,
        message: Option<String>,
    },
    /// Only an informational message.
    MessageOnly(String),
    /// Anything else, shown verbatim.
    Raw(Value),
}

/// Maps a payload to its presentation.
///
/// `columns` and `rows` must both be arrays to count as a result set; a
/// payload carrying them in another shape falls through to the next rule.
pub fn classify(payload: &ExecutePayload) -> Presentation {
    if let (Some(columns), Some(rows)) = (payload.columns(), payload.rows()) {
        return Presentation::Tabular {
            columns,
            rows: rows.clone(),
        };
    }

    let has_summary = payload.field("rows_affected").is_some()
        || payload.field("execution_time").is_some()
        || payload.is_cache_hit();
    if has_summary {
        return Presentation::Mutation {
            rows_affected: payload.rows_affected(),
            execution_time_secs: payload.execution_time(),
            from_cache: payload.is_cache_hit(),
            message: payload.message().map(str::to_string),
        };
    }

    if let Some(message) = payload.field("message") {
        let text = match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Presentation::MessageOnly(text);
    }

    Presentation::Raw(payload.as_value().clone())
}

impl Presentation {
    /// Short label of the classification.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tabular { .. } => "tabular",
            Self::Mutation { .. } => "mutation",
            Self::MessageOnly(_) => "message",
            Self::Raw(_) => "raw",
        }
    }
}

fn cell_text(row: &Value, index: usize, column: &str) -> String {
    let cell = match row {
        Value::Object(map) => map.get(column),
        Value::Array(items) => items.get(index),
        _ => None,
    };
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, values: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(v, &w)| format!("{v:<w$}"))
        .collect();
    writeln!(f, "{}", padded.join(" | ").trim_end())
}

fn write_table(f: &mut fmt::Formatter<'_>, columns: &[String], rows: &[Value]) -> fmt::Result {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| cell_text(row, i, col))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_row(f, columns, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(f, "{}", rule.join("-+-"))?;
    for row in &cells {
        write_row(f, row, &widths)?;
    }
    write!(
        f,
        "({} row{})",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    )
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tabular { columns, rows } => write_table(f, columns, rows),
            Self::Mutation {
                rows_affected,
                execution_time_secs,
                from_cache,
                message,
            } => {
                let mut lines = Vec::new();
                if *from_cache {
                    lines.push("(served from cache)".to_string());
                }
                if let Some(n) = rows_affected {
                    lines.push(format!("{n} rows affected"));
                }
                if let Some(secs) = execution_time_secs {
                    lines.push(format!("Execution time: {secs:.4} s"));
                }
                if let Some(message) = message {
                    lines.push(message.clone());
                }
                write!(f, "{}", lines.join("\n"))
            }
            Self::MessageOnly(text) => write!(f, "{text}"),
            Self::Raw(value) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                write!(f, "{pretty}")
            }
        }
    }
}
