//! Row materialization: result rows to SQL literal tuples.

use std::collections::HashSet;

use crate::config::Dialect;
use crate::database::{Row, SqlValue};
use crate::error_handling::ExportError;

/// Column set of one statement with the skip filter already applied.
///
/// Built from the first row of a result set and reused, unchanged, for every
/// following row of the same statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSet {
    names: Vec<String>,
    included: Vec<usize>,
}

impl ColumnSet {
    /// Computes skip-set membership once for `columns`.
    pub fn new(columns: &[String], skip_fields: &HashSet<String>) -> Self {
        let included = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !skip_fields.contains(name.as_str()))
            .map(|(i, _)| i)
            .collect();
        Self {
            names: columns.to_vec(),
            included,
        }
    }

    /// All column names of the result set, skipped ones included.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns every row of the result set must carry.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Names of the columns written to the output, in result order.
    pub fn included_names(&self) -> impl Iterator<Item = &str> {
        self.included.iter().map(|&i| self.names[i].as_str())
    }

    /// Whether the skip filter removed every column.
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    /// `(a, b, c)` column clause body with dialect quoting.
    pub fn column_clause(&self, dialect: Dialect) -> String {
        self.included_names()
            .map(|name| dialect.quote_identifier(name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Converts one row into quoted literals, one per included column.
///
/// `row_number` is the 1-based position of the row in its statement and is
/// only used for error reporting.
///
/// # Errors
///
/// Returns [`ExportError::ColumnCountMismatch`] when the row does not carry
/// exactly one value per column of `columns`.
pub fn materialize_row(
    row: &Row,
    columns: &ColumnSet,
    dialect: Dialect,
    row_number: usize,
) -> Result<Vec<String>, ExportError> {
    let values = row.values();
    let found = if values.len() != columns.width() {
        values.len()
    } else {
        row.columns().len()
    };
    if found != columns.width() {
        return Err(ExportError::ColumnCountMismatch {
            row: row_number,
            expected: columns.width(),
            found,
        });
    }

    Ok(columns
        .included
        .iter()
        .map(|&i| render_literal(&values[i], dialect))
        .collect())
}

/// Renders a value as a SQL literal for `dialect`.
///
/// NULL stays unquoted, binary data becomes a hex literal, everything else is
/// escaped and single-quoted.
pub fn render_literal(value: &SqlValue, dialect: Dialect) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bytes(bytes) => match dialect {
            Dialect::Mysql => format!("X'{}'", hex::encode_upper(bytes)),
            Dialect::Postgres => format!("decode('{}', 'hex')", hex::encode(bytes)),
        },
        SqlValue::Bool(b) => {
            let text = match (dialect, *b) {
                (Dialect::Mysql, true) => "1",
                (Dialect::Mysql, false) => "0",
                (Dialect::Postgres, true) => "true",
                (Dialect::Postgres, false) => "false",
            };
            format!("'{text}'")
        }
        other => {
            let text = other.to_plain_text().unwrap_or_default();
            format!("'{}'", dialect.escape(&text))
        }
    }
}
