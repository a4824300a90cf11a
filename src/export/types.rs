//! Export types and options.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU64;
use std::path::PathBuf;

use crate::config::Dialect;

/// Where the rows of a data export come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    /// `SELECT *` over the table, one bounded page per chunk
    Chunked,
    /// One query read verbatim from a file
    QueryFile(PathBuf),
}

/// Immutable parameters of one data export run.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Target table, used in queries and in generated INSERT statements
    pub table: String,
    /// Dialect selecting escaping and identifier quoting
    pub dialect: Dialect,
    /// Rows requested per chunk query
    pub chunk_size: NonZeroU64,
    /// Chunked scan or query file
    pub source: DataSource,
    /// Columns left out of every generated statement
    pub skip_fields: HashSet<String>,
}

/// Counters of a finished data export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataExportSummary {
    /// Chunk queries issued (0 in query-file mode)
    pub chunks: u64,
    /// INSERT statements written
    pub statements: usize,
    /// Rows written across all statements
    pub rows: u64,
}

/// Counters of a finished schema export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaExportSummary {
    /// Tables processed
    pub tables: usize,
    /// CREATE statements written
    pub statements: usize,
}

/// Progress of a data export run.
///
/// `Idle -> CountingRows (chunked only) -> IteratingChunks | RunningFileQuery
/// -> Done`, with any failure moving to the terminal `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPhase {
    /// Nothing issued yet
    Idle,
    /// Running `SELECT COUNT(*)`
    CountingRows,
    /// Running chunk queries
    IteratingChunks,
    /// Running the query read from the input file
    RunningFileQuery,
    /// Finished successfully
    Done,
    /// Aborted by an error
    Failed,
}

impl ExportPhase {
    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportPhase::Done | ExportPhase::Failed)
    }
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportPhase::Idle => "idle",
            ExportPhase::CountingRows => "counting rows",
            ExportPhase::IteratingChunks => "iterating chunks",
            ExportPhase::RunningFileQuery => "running file query",
            ExportPhase::Done => "done",
            ExportPhase::Failed => "failed",
        })
    }
}
