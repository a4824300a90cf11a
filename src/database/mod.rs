//! Database access for export runs.
//!
//! This module provides:
//! - Connection establishment for MySQL and PostgreSQL
//! - Per-dialect decoding of result rows into [`Row`] / [`SqlValue`]
//! - The [`RowSource`] trait the export core reads through
//!
//! The export core never sees a driver type. Anything that can count the rows
//! of a table and stream the rows of a query can feed an export, which is how
//! the tests drive it without a server.

mod connection;
mod mysql;
mod postgres;
mod value;

use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::error_handling::DatabaseError;

// Re-export public API
pub use connection::{connect, DbConnection};
pub use value::{Row, SqlValue};

/// Source of rows for an export run.
///
/// Implementations run one statement at a time; the caller never holds two
/// streams from the same source.
pub trait RowSource {
    /// Returns `SELECT COUNT(*)` of `table`.
    fn count_rows<'a>(&'a mut self, table: &'a str) -> BoxFuture<'a, Result<u64, DatabaseError>>;

    /// Executes `sql` and streams its rows in result order.
    fn fetch_rows<'a>(&'a mut self, sql: &'a str) -> BoxStream<'a, Result<Row, DatabaseError>>;
}
