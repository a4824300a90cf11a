//! Schema (DDL) export.

use std::io::Write;
use std::sync::LazyLock;

use futures::TryStreamExt;
use log::{debug, info};
use regex::Regex;

use crate::config::{Dialect, ALL_TABLES};
use crate::database::{Row, RowSource};
use crate::error_handling::ExportError;

use super::types::SchemaExportSummary;

static AUTO_INCREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AUTO_INCREMENT=\d+\s*").expect("valid AUTO_INCREMENT pattern"));

const CREATE_TABLE_COLUMN: &str = "Create Table";

/// Writes `DROP TABLE IF EXISTS` plus the `CREATE TABLE` statement of every
/// requested table.
///
/// `tables` is either `all` or a comma-separated list. `AUTO_INCREMENT=<n>`
/// counters are stripped so the dump recreates empty tables.
///
/// # Errors
///
/// Only MySQL is supported. Query failures and write failures abort the run.
pub async fn export_schema<S, W>(
    source: &mut S,
    dialect: Dialect,
    tables: &str,
    out: &mut W,
) -> Result<SchemaExportSummary, ExportError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    if dialect != Dialect::Mysql {
        return Err(ExportError::SchemaUnsupported(dialect));
    }

    let tables = resolve_tables(source, tables).await?;
    info!("Exporting schema of {} table(s)", tables.len());

    let mut summary = SchemaExportSummary::default();
    for table in &tables {
        let quoted = dialect.quote_identifier(table);
        let sql = format!("SHOW CREATE TABLE {quoted}");
        debug!("Executing: {sql}");
        let row = first_row(source, &sql, table).await?;
        let create = row
            .get(CREATE_TABLE_COLUMN)
            .or_else(|| row.values().get(1))
            .and_then(|v| v.to_plain_text())
            .ok_or_else(|| ExportError::MissingCreateStatement(table.clone()))?;

        writeln!(out, "DROP TABLE IF EXISTS {quoted};")?;
        writeln!(out, "{};\n", strip_auto_increment(&create))?;
        summary.tables += 1;
        summary.statements += 1;
    }
    Ok(summary)
}

/// Removes `AUTO_INCREMENT=<n>` table options from a create statement.
pub fn strip_auto_increment(create: &str) -> String {
    AUTO_INCREMENT.replace_all(create, "").trim_end().to_string()
}

async fn resolve_tables<S>(source: &mut S, tables: &str) -> Result<Vec<String>, ExportError>
where
    S: RowSource + ?Sized,
{
    if tables.trim() != ALL_TABLES {
        return Ok(tables
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect());
    }

    debug!("Executing: SHOW TABLES");
    let mut rows = source.fetch_rows("SHOW TABLES");
    let mut names = Vec::new();
    while let Some(row) = rows.try_next().await.map_err(|source| ExportError::SchemaQuery {
        table: ALL_TABLES.to_string(),
        source,
    })? {
        if let Some(name) = row.values().first().and_then(|v| v.to_plain_text()) {
            names.push(name);
        }
    }
    Ok(names)
}

async fn first_row<S>(source: &mut S, sql: &str, table: &str) -> Result<Row, ExportError>
where
    S: RowSource + ?Sized,
{
    let mut rows = source.fetch_rows(sql);
    rows.try_next()
        .await
        .map_err(|source| ExportError::SchemaQuery {
            table: table.to_string(),
            source,
        })?
        .ok_or_else(|| ExportError::MissingCreateStatement(table.to_string()))
}
