//! Data export driver: chunked table scans and query files.

use std::io::Write;
use std::path::Path;

use futures::TryStreamExt;
use log::{debug, info};

use crate::database::RowSource;
use crate::error_handling::ExportError;

use super::chunk::plan;
use super::output::{chunk_marker, write_comment};
use super::statement::{FinishedStatement, StatementBuilder};
use super::types::{DataExportSummary, DataSource, ExportConfig, ExportPhase};

/// Tracks and logs the phase of one export run.
#[derive(Debug)]
struct PhaseTracker {
    phase: ExportPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: ExportPhase::Idle,
        }
    }

    fn enter(&mut self, next: ExportPhase) {
        debug!("Export phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn current(&self) -> ExportPhase {
        self.phase
    }
}

/// Exports the rows selected by `config` as INSERT statements into `out`.
///
/// In chunked mode the table is counted first and then read one
/// `LIMIT/OFFSET` page at a time, each page preceded by a chunk marker and
/// turned into its own statement. In query-file mode the file's query runs
/// once and its whole result becomes a single statement.
///
/// Queries run strictly one after another and rows are written as they
/// arrive. Pages are not read inside a snapshot, so concurrent writes to the
/// table can make rows appear twice or not at all.
///
/// # Errors
///
/// Any database, decode, row-shape or statement write error aborts the run.
/// Failing to write a chunk marker is only logged.
pub async fn export_data<S, W>(
    source: &mut S,
    config: &ExportConfig,
    out: &mut W,
) -> Result<DataExportSummary, ExportError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    let mut phase = PhaseTracker::new();
    let result = match &config.source {
        DataSource::Chunked => export_chunked(source, config, out, &mut phase).await,
        DataSource::QueryFile(path) => export_query_file(source, config, path, out, &mut phase).await,
    };

    match result {
        Ok(summary) => {
            phase.enter(ExportPhase::Done);
            info!(
                "Exported {} rows of {} in {} statement(s)",
                summary.rows, config.table, summary.statements
            );
            Ok(summary)
        }
        Err(e) => {
            phase.enter(ExportPhase::Failed);
            Err(e)
        }
    }
}

async fn export_chunked<S, W>(
    source: &mut S,
    config: &ExportConfig,
    out: &mut W,
    phase: &mut PhaseTracker,
) -> Result<DataExportSummary, ExportError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    phase.enter(ExportPhase::CountingRows);
    debug!("Executing: SELECT COUNT(*) FROM {}", config.table);
    let total_rows = source
        .count_rows(&config.table)
        .await
        .map_err(|source| ExportError::Query {
            phase: phase.current(),
            source,
        })?;

    let chunks = plan(total_rows, config.chunk_size);
    info!(
        "Exporting {} rows of {} in {} chunk(s) of {}",
        total_rows,
        config.table,
        chunks.chunk_count(),
        config.chunk_size
    );

    phase.enter(ExportPhase::IteratingChunks);
    let mut summary = DataExportSummary::default();
    let mut expected_columns: Option<Vec<String>> = None;
    for chunk in chunks {
        write_comment(out, &chunk_marker(chunk.index));
        let sql = chunk.select_sql(&config.table);
        let finished = write_statement(
            source,
            &sql,
            config,
            out,
            expected_columns.as_deref(),
            phase.current(),
        )
        .await?;
        summary.chunks += 1;

        match finished {
            Some(statement) => {
                debug!("Chunk {} wrote {} rows", chunk.index, statement.rows);
                summary.statements += 1;
                summary.rows += statement.rows as u64;
                expected_columns.get_or_insert(statement.columns);
            }
            None => debug!("Chunk {} returned no rows", chunk.index),
        }
    }
    Ok(summary)
}

async fn export_query_file<S, W>(
    source: &mut S,
    config: &ExportConfig,
    path: &Path,
    out: &mut W,
    phase: &mut PhaseTracker,
) -> Result<DataExportSummary, ExportError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    let sql = read_query_file(path).await?;
    info!("Exporting {} from query file {}", config.table, path.display());

    phase.enter(ExportPhase::RunningFileQuery);
    let finished = write_statement(source, &sql, config, out, None, phase.current()).await?;

    let mut summary = DataExportSummary::default();
    if let Some(statement) = finished {
        summary.statements = 1;
        summary.rows = statement.rows as u64;
    }
    Ok(summary)
}

/// Reads a query file, dropping surrounding whitespace and trailing `;`.
pub async fn read_query_file(path: &Path) -> Result<String, ExportError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ExportError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;

    let sql = raw
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if sql.is_empty() {
        return Err(ExportError::EmptyQuery(path.to_path_buf()));
    }
    Ok(sql.to_string())
}

/// Runs `sql` and streams its rows into one INSERT statement.
async fn write_statement<S, W>(
    source: &mut S,
    sql: &str,
    config: &ExportConfig,
    out: &mut W,
    expected_columns: Option<&[String]>,
    phase: ExportPhase,
) -> Result<Option<FinishedStatement>, ExportError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    debug!("Executing: {sql}");
    let mut rows = source.fetch_rows(sql);
    let mut builder = StatementBuilder::new(out, config).expect_columns(expected_columns);
    while let Some(row) = rows
        .try_next()
        .await
        .map_err(|source| ExportError::Query { phase, source })?
    {
        builder.push_row(&row)?;
    }
    builder.finish()
}
