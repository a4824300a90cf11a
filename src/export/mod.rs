//! Export of database contents as SQL text.
//!
//! This module provides:
//! - Dialect escaping and identifier quoting
//! - Row materialization into SQL literal tuples
//! - Streaming INSERT statement assembly
//! - Chunk planning and the data export driver
//! - Schema (DDL) export for MySQL
//! - The output sink with its header and chunk marker comments

mod chunk;
mod data;
mod escape;
mod materialize;
mod output;
mod schema;
mod statement;
mod types;

// Re-export public API
pub use chunk::{plan, Chunk, ChunkPlan, Chunks};
pub use data::{export_data, read_query_file};
pub use escape::{add_slashes, pg_escape};
pub use materialize::{materialize_row, render_literal, ColumnSet};
pub use output::{chunk_marker, header_comment, open_output, write_comment, OutputSink};
pub use schema::{export_schema, strip_auto_increment};
pub use statement::{FinishedStatement, StatementBuilder};
pub use types::{
    DataExportSummary, DataSource, ExportConfig, ExportPhase, SchemaExportSummary,
};
