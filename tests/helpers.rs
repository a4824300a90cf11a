// Shared test helpers: an in-memory row source and export configs.
//
// The fake source serves `LIMIT/OFFSET` pages from an in-memory table and
// records every statement it receives, so tests can assert on the exact query
// sequence without a database server.

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroU64;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};

use db_export::database::{Row, RowSource, SqlValue};
use db_export::error_handling::DatabaseError;
use db_export::export::{DataSource, ExportConfig};
use db_export::Dialect;

/// Scripted answer to one `fetch_rows` call.
#[allow(dead_code)] // Not every test file uses every variant
pub enum Scripted {
    /// Result set returned as is
    Rows(Vec<Row>),
    /// Stream yields these rows, then fails
    FailAfter(Vec<Row>, String),
}

/// In-memory [`RowSource`].
///
/// `fetch_rows` pops scripted answers first; without one it serves the
/// in-memory table, paged when the statement carries `LIMIT`/`OFFSET`.
pub struct FakeSource {
    columns: Arc<[String]>,
    table: Vec<Vec<SqlValue>>,
    count_override: Option<Result<u64, String>>,
    scripted: VecDeque<Scripted>,
    /// Every statement received, in order
    pub statements: Vec<String>,
}

#[allow(dead_code)] // Used by other test files
impl FakeSource {
    /// Table with the given columns and rows.
    pub fn table(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            table: rows,
            count_override: None,
            scripted: VecDeque::new(),
            statements: Vec::new(),
        }
    }

    /// Empty table and no scripted answers.
    pub fn empty() -> Self {
        Self::table(&[], Vec::new())
    }

    /// `(id, name)` table with `n` rows: `(1, "name-1")`, `(2, "name-2")`...
    pub fn numbered(n: u64) -> Self {
        let rows = (1..=n)
            .map(|i| {
                vec![
                    SqlValue::Int(i as i64),
                    SqlValue::Text(format!("name-{i}")),
                ]
            })
            .collect();
        Self::table(&["id", "name"], rows)
    }

    /// Reports `count` rows regardless of the table contents.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count_override = Some(Ok(count));
        self
    }

    /// Fails the row count with `message`.
    pub fn with_count_error(mut self, message: &str) -> Self {
        self.count_override = Some(Err(message.to_string()));
        self
    }

    /// Queues an answer for the next `fetch_rows` call.
    pub fn script(mut self, answer: Scripted) -> Self {
        self.scripted.push_back(answer);
        self
    }

    fn page(&self, sql: &str) -> Vec<Row> {
        let (limit, offset) = parse_page(sql).unwrap_or((self.table.len(), 0));
        self.table
            .iter()
            .skip(offset)
            .take(limit)
            .map(|values| Row::new(Arc::clone(&self.columns), values.clone()))
            .collect()
    }
}

impl RowSource for FakeSource {
    fn count_rows<'a>(&'a mut self, table: &'a str) -> BoxFuture<'a, Result<u64, DatabaseError>> {
        self.statements
            .push(format!("SELECT COUNT(*) AS total FROM {table}"));
        let result = match &self.count_override {
            Some(Ok(count)) => Ok(*count),
            Some(Err(message)) => Err(sql_error(message)),
            None => Ok(self.table.len() as u64),
        };
        future::ready(result).boxed()
    }

    fn fetch_rows<'a>(&'a mut self, sql: &'a str) -> BoxStream<'a, Result<Row, DatabaseError>> {
        self.statements.push(sql.to_string());
        let items: Vec<Result<Row, DatabaseError>> = match self.scripted.pop_front() {
            Some(Scripted::Rows(rows)) => rows.into_iter().map(Ok).collect(),
            Some(Scripted::FailAfter(rows, message)) => rows
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(sql_error(&message))))
                .collect(),
            None => self.page(sql).into_iter().map(Ok).collect(),
        };
        stream::iter(items).boxed()
    }
}

fn sql_error(message: &str) -> DatabaseError {
    DatabaseError::SqlError(sqlx::Error::Protocol(message.to_string()))
}

/// Extracts `(limit, offset)` from `... LIMIT n OFFSET m`.
fn parse_page(sql: &str) -> Option<(usize, usize)> {
    let mut words = sql.split_whitespace();
    let mut limit = None;
    let mut offset = 0;
    while let Some(word) = words.next() {
        match word {
            "LIMIT" => limit = words.next()?.parse().ok(),
            "OFFSET" => offset = words.next()?.parse().ok()?,
            _ => {}
        }
    }
    Some((limit?, offset))
}

/// Rows sharing one column list.
#[allow(dead_code)] // Used by other test files
pub fn rows(columns: &[&str], data: Vec<Vec<SqlValue>>) -> Vec<Row> {
    let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
    data.into_iter()
        .map(|values| Row::new(Arc::clone(&columns), values))
        .collect()
}

/// Chunked export config for `table`.
#[allow(dead_code)] // Used by other test files
pub fn chunked_config(table: &str, dialect: Dialect, chunk_size: u64) -> ExportConfig {
    ExportConfig {
        table: table.to_string(),
        dialect,
        chunk_size: NonZeroU64::new(chunk_size).expect("chunk size must be non-zero"),
        source: DataSource::Chunked,
        skip_fields: HashSet::new(),
    }
}

/// Output buffer as text.
#[allow(dead_code)] // Used by other test files
pub fn text(out: &[u8]) -> String {
    String::from_utf8(out.to_vec()).expect("export output is UTF-8")
}
