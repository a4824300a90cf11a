//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `db_export` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing summary and exit codes
//!
//! All core functionality is implemented in the library crate.

use clap::Parser;
use log::{error, info};
use std::process;

use db_export::initialization::init_logger_with;
use db_export::{exit_code_for, run_export, Config};

#[tokio::main]
async fn main() {
    // Parse command-line arguments into Config
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    if let Err(e) = init_logger_with(log_level.into(), log_format) {
        let e = anyhow::Error::new(e).context("Failed to initialize logger");
        eprintln!("db_export error: {:#}", e);
        process::exit(exit_code_for(&e));
    }

    match run_export(config).await {
        Ok(report) => {
            info!(
                "Exported {} ({} table{}, {} chunk{}, {} statement{}, {} row{}) in {:.1}s",
                report.mode,
                report.tables,
                if report.tables == 1 { "" } else { "s" },
                report.chunks,
                if report.chunks == 1 { "" } else { "s" },
                report.statements,
                if report.statements == 1 { "" } else { "s" },
                report.rows,
                if report.rows == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            if let Some(path) = report.output {
                info!("Output saved in {}", path.display());
            }
        }
        Err(e) => {
            error!("db_export error: {:#}", e);
            process::exit(exit_code_for(&e));
        }
    }
}
