//! Splits a submitted buffer into statements.
//!
//! Splitting is purely lexical: every `;` ends a statement, including one
//! inside a string literal or comment.

use std::fmt;

/// One non-empty, trimmed, semicolon-delimited unit of SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    /// Returns the statement text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Splits `raw` on `;`, trims each piece and drops the empty ones.
pub fn split_statements(raw: &str) -> Vec<Statement> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Statement(s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(raw: &str) -> Vec<String> {
        split_statements(raw)
            .into_iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_two_statements_trailing_semicolon() {
        assert_eq!(texts("SELECT 1; SELECT 2;"), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_only_separators_yields_nothing() {
        assert!(split_statements("  ; ;  ").is_empty());
        assert!(split_statements("").is_empty());
    }

    #[test]
    fn test_no_terminator() {
        assert_eq!(texts("  SELECT * FROM shop.orders  "), vec!["SELECT * FROM shop.orders"]);
    }

    #[test]
    fn test_multiline_statements_keep_inner_newlines() {
        let raw = "CREATE TABLE shop.t (\n  id INT\n);\n\nINSERT INTO shop.t VALUES (1);";
        assert_eq!(
            texts(raw),
            vec!["CREATE TABLE shop.t (\n  id INT\n)", "INSERT INTO shop.t VALUES (1)"]
        );
    }

    #[test]
    fn test_semicolon_in_literal_is_not_special() {
        assert_eq!(
            texts("INSERT INTO shop.t VALUES ('a;b')"),
            vec!["INSERT INTO shop.t VALUES ('a", "b')"]
        );
    }
}
