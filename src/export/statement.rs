//! INSERT statement assembly.

use std::collections::HashSet;
use std::io::Write;

use crate::config::Dialect;
use crate::database::Row;
use crate::error_handling::ExportError;

use super::materialize::{materialize_row, ColumnSet};
use super::types::ExportConfig;

/// Result of a statement that received at least one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedStatement {
    /// Rows written into the statement
    pub rows: usize,
    /// Column names of the result set, skipped columns included
    pub columns: Vec<String>,
}

/// Writes one `INSERT INTO ... VALUES ...;` statement row by row.
///
/// The column clause is fixed by the first row. A statement that never
/// receives a row writes nothing at all.
pub struct StatementBuilder<'a, W: Write> {
    out: &'a mut W,
    table: String,
    dialect: Dialect,
    skip_fields: &'a HashSet<String>,
    expected_columns: Option<&'a [String]>,
    columns: Option<ColumnSet>,
    rows: usize,
}

impl<'a, W: Write> StatementBuilder<'a, W> {
    /// Starts a statement for the table and dialect of `config`.
    pub fn new(out: &'a mut W, config: &'a ExportConfig) -> Self {
        Self {
            out,
            table: config.dialect.quote_identifier(&config.table),
            dialect: config.dialect,
            skip_fields: &config.skip_fields,
            expected_columns: None,
            columns: None,
            rows: 0,
        }
    }

    /// Requires the first row to carry exactly these column names.
    ///
    /// Used to keep every chunk of one export on the column set of the first
    /// chunk.
    pub fn expect_columns(mut self, columns: Option<&'a [String]>) -> Self {
        self.expected_columns = columns;
        self
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Appends one row, writing the statement head first if needed.
    ///
    /// # Errors
    ///
    /// Fails when the row shape does not match the statement's column set,
    /// when the first row's columns differ from the expected ones, when every
    /// column is skipped, or when writing to the output fails.
    pub fn push_row(&mut self, row: &Row) -> Result<(), ExportError> {
        if self.columns.is_none() {
            self.columns = Some(self.open_statement(row)?);
        }
        let Some(columns) = self.columns.as_ref() else {
            return Ok(());
        };

        let values = materialize_row(row, columns, self.dialect, self.rows + 1)?;
        if self.rows > 0 {
            self.out.write_all(b",\n")?;
        }
        write!(self.out, "({})", values.join(", "))?;
        self.rows += 1;
        Ok(())
    }

    /// Terminates the statement.
    ///
    /// Returns `None`, having written nothing, when no row was pushed.
    pub fn finish(self) -> Result<Option<FinishedStatement>, ExportError> {
        match self.columns {
            Some(columns) if self.rows > 0 => {
                self.out.write_all(b";\n\n")?;
                Ok(Some(FinishedStatement {
                    rows: self.rows,
                    columns: columns.names().to_vec(),
                }))
            }
            _ => Ok(None),
        }
    }

    fn open_statement(&mut self, first: &Row) -> Result<ColumnSet, ExportError> {
        if let Some(expected) = self.expected_columns {
            if expected != first.columns() {
                return Err(ExportError::ColumnSetChanged {
                    expected: expected.join(", "),
                    found: first.columns().join(", "),
                });
            }
        }

        let columns = ColumnSet::new(first.columns(), self.skip_fields);
        if columns.is_empty() {
            return Err(ExportError::NoColumnsSelected(self.table.clone()));
        }

        writeln!(
            self.out,
            "INSERT INTO {} ({}) VALUES",
            self.table,
            columns.column_clause(self.dialect)
        )?;
        Ok(columns)
    }
}
