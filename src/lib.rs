//! db_export library: MySQL and PostgreSQL export as SQL text
//!
//! This library exports either the schema (`DROP TABLE` + `CREATE TABLE`) or
//! the data (`INSERT INTO ... VALUES ...`) of database tables. Data is read in
//! fixed-size chunks, or from a single query stored in a file, and streamed
//! row by row into the output so memory stays bounded by one row plus output
//! buffering.
//!
//! # Example
//!
//! ```no_run
//! use db_export::{run_export, Config, ExportMode};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_name: "shop".to_string(),
//!     db_user: "root".to_string(),
//!     model: ExportMode::Data,
//!     table: "users".to_string(),
//!     output: Some(std::path::PathBuf::from("users.sql")),
//!     ..Default::default()
//! };
//!
//! let report = run_export(config).await?;
//! println!("Exported {} rows in {} statements", report.rows, report.statements);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod config;
pub mod database;
pub mod error_handling;
pub mod export;
pub mod initialization;

// Re-export public API
pub use config::{Config, Dialect, ExportMode, LogFormat, LogLevel};
pub use error_handling::exit_code_for;
pub use run::{run_export, ExportReport};

// Internal run module (wires configuration, connection, output and export)
mod run {
    use std::io::Write;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use chrono::Local;
    use log::{info, warn};

    use crate::config::{Config, ExportMode};
    use crate::database::connect;
    use crate::error_handling::ExportError;
    use crate::export::{export_data, export_schema, header_comment, open_output, write_comment};

    /// Results of an export run.
    #[derive(Debug, Clone)]
    pub struct ExportReport {
        /// What was exported
        pub mode: ExportMode,
        /// Tables whose schema was written (0 for data exports)
        pub tables: usize,
        /// Chunk queries issued (0 for schema and query-file exports)
        pub chunks: u64,
        /// Statements written
        pub statements: usize,
        /// Rows written (0 for schema exports)
        pub rows: u64,
        /// Output file, `None` for stdout
        pub output: Option<PathBuf>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs one export with the provided configuration.
    ///
    /// Validates the options, opens one connection and the output sink, writes
    /// the header comment, runs the schema or data export and flushes the
    /// output. The connection is closed whether or not the export succeeded.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Use [`crate::exit_code_for`] to map it to
    /// the process exit code of its failure site. Output written before the
    /// failure stays in place.
    pub async fn run_export(config: Config) -> Result<ExportReport> {
        let start_time = std::time::Instant::now();
        config.validate().context("Invalid options")?;

        let mut conn = connect(&config)
            .await
            .context("Failed to connect to database")?;
        let mut out = open_output(config.output.as_deref()).context("Failed to open output")?;
        let dialect = conn.dialect();

        write_comment(&mut out, &header_comment(config.model, Local::now().naive_local()));

        let mut report = ExportReport {
            mode: config.model,
            tables: 0,
            chunks: 0,
            statements: 0,
            rows: 0,
            output: config.output.clone(),
            elapsed_seconds: 0.0,
        };

        let exported = match config.model {
            ExportMode::Schema => {
                info!("Exporting schema of `{}`", config.table);
                export_schema(&mut conn, dialect, &config.table, &mut out)
                    .await
                    .map(|summary| {
                        report.tables = summary.tables;
                        report.statements = summary.statements;
                    })
            }
            ExportMode::Data => {
                let export_config = config.export_config();
                export_data(&mut conn, &export_config, &mut out)
                    .await
                    .map(|summary| {
                        report.chunks = summary.chunks;
                        report.statements = summary.statements;
                        report.rows = summary.rows;
                    })
            }
        };

        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection: {}", e);
        }
        exported.context("Export failed")?;

        out.flush()
            .map_err(ExportError::OutputWrite)
            .context("Failed to flush output")?;

        report.elapsed_seconds = start_time.elapsed().as_secs_f64();
        Ok(report)
    }
}
