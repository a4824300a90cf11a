//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU64;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::constants::{
    CHUNK_SIZE, DEFAULT_CHARSET, DEFAULT_DB_HOST, DEFAULT_MYSQL_PORT, DEFAULT_POSTGRES_PORT,
};
use crate::export::{DataSource, ExportConfig};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// SQL dialect of the source database.
///
/// Bound once per run; it selects the driver, the string escaper, and the
/// identifier quoting used in generated statements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dialect {
    /// MySQL / MariaDB
    Mysql,
    /// PostgreSQL
    Postgres,
}

impl Dialect {
    /// Port used when the host option carries none.
    pub fn default_port(self) -> u16 {
        match self {
            Dialect::Mysql => DEFAULT_MYSQL_PORT,
            Dialect::Postgres => DEFAULT_POSTGRES_PORT,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
        })
    }
}

/// What an export run produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportMode {
    /// `DROP TABLE IF EXISTS` + `CREATE TABLE` statements
    Schema,
    /// `INSERT INTO` statements for table rows
    Data,
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportMode::Schema => "schema",
            ExportMode::Data => "data",
        })
    }
}

/// Command-line options and configuration.
///
/// Parsed once at startup by `clap`, validated with [`Config::validate`], and
/// then only read. The export core receives the narrower [`ExportConfig`]
/// built by [`Config::export_config`].
///
/// # Examples
///
/// ```bash
/// # Schema of two tables to stdout
/// db_export --db-name shop --db-user root --table users,orders
///
/// # Data of one table, chunked, skipping a column
/// db_export --db-type postgres --db-name shop --db-user app --model data \
///     --table users --skip-field password_hash --output users.sql
///
/// # Data from a custom query
/// db_export --db-name shop --db-user root --model data --table users \
///     --chunk=false --input active_users.sql
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db_export",
    version,
    about = "Exports MySQL or PostgreSQL table schema or data as SQL statements."
)]
pub struct Config {
    /// Database type: mysql|postgres
    #[arg(long, value_enum, default_value_t = Dialect::Mysql)]
    pub db_type: Dialect,

    /// Database name
    #[arg(long)]
    pub db_name: String,

    /// Database host, optionally with a port (host:port)
    #[arg(long, default_value = DEFAULT_DB_HOST)]
    pub db_host: String,

    /// Database user
    #[arg(long, default_value = "")]
    pub db_user: String,

    /// Database password
    #[arg(long, default_value = "")]
    pub db_pwd: String,

    /// Connection charset (MySQL only)
    #[arg(long, default_value = DEFAULT_CHARSET)]
    pub db_charset: String,

    /// Export model: schema|data
    #[arg(long, value_enum, default_value_t = ExportMode::Schema)]
    pub model: ExportMode,

    /// Table name; for schema export a comma-separated list or `all`
    #[arg(long, default_value = "")]
    pub table: String,

    /// Export data in chunks of fixed size (`--chunk=false` requires `--input`)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub chunk: bool,

    /// File holding the query used for data export when chunking is disabled
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Comma-separated columns left out of generated INSERT statements
    #[arg(long, value_delimiter = ',')]
    pub skip_field: Vec<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_type: Dialect::Mysql,
            db_name: String::new(),
            db_host: DEFAULT_DB_HOST.to_string(),
            db_user: String::new(),
            db_pwd: String::new(),
            db_charset: DEFAULT_CHARSET.to_string(),
            model: ExportMode::Schema,
            table: String::new(),
            chunk: true,
            input: None,
            output: None,
            skip_field: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Builds the immutable parameters of a data export.
    ///
    /// Call after [`Config::validate`]; with chunking disabled and no input
    /// file the data source falls back to chunked mode.
    pub fn export_config(&self) -> ExportConfig {
        let source = match (&self.input, self.chunk) {
            (Some(path), false) => DataSource::QueryFile(path.clone()),
            _ => DataSource::Chunked,
        };

        let skip_fields: HashSet<String> = self
            .skip_field
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();

        ExportConfig {
            table: self.table.trim().to_string(),
            dialect: self.db_type,
            chunk_size: NonZeroU64::new(CHUNK_SIZE).unwrap_or(NonZeroU64::MIN),
            source,
            skip_fields,
        }
    }
}
