//! Error type definitions.
//!
//! This module defines all error types used throughout the application and the
//! failure sites they map to.

use std::io;
use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::Dialect;
use crate::export::ExportPhase;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Option combinations rejected before any connection is attempted.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `--db-name` is empty.
    #[error("please set db name")]
    MissingDatabase,

    /// `--db-host` is empty.
    #[error("please set db host")]
    MissingHost,

    /// `--db-host` has an unparseable port.
    #[error("invalid db host: {0}")]
    InvalidHost(String),

    /// `--db-user` is empty.
    #[error("please set db user")]
    MissingUser,

    /// Schema export without `--table`.
    #[error("export schema, but no table assigned")]
    MissingSchemaTable,

    /// Data export with `--chunk=false` but no `--input`.
    #[error("export data, but no sql file assigned")]
    MissingQueryFile,

    /// Data export without `--table`.
    #[error("please assign table name")]
    MissingTable,
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The database could not be reached or rejected the credentials.
    #[error("Cannot connect to {dialect} at {host}:{port}: {source}")]
    ConnectError {
        /// Dialect of the attempted connection
        dialect: Dialect,
        /// Host part of the address
        host: String,
        /// Port part of the address
        port: u16,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A column value could not be decoded into a printable value.
    #[error("Cannot decode column `{column}` of type {type_name}: {source}")]
    DecodeError {
        /// Column name
        column: String,
        /// Database type name reported by the driver
        type_name: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },
}

/// Error types for export runs.
///
/// Every variant is fatal for the run; output already written is left in
/// place.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output file could not be created.
    #[error("Cannot open output file {path}: {source}")]
    OutputOpen {
        /// Requested output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing a statement to the output failed.
    #[error("Cannot write output: {0}")]
    OutputWrite(#[from] io::Error),

    /// The query file could not be read.
    #[error("Cannot read sql file {path}: {source}")]
    InputRead {
        /// Query file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The query file holds no statement.
    #[error("sql file {0} contains no query")]
    EmptyQuery(PathBuf),

    /// A query failed; `phase` names what the run was doing at the time.
    #[error("Query failed while {phase}: {source}")]
    Query {
        /// Phase of the export run
        phase: ExportPhase,
        /// Database error
        #[source]
        source: DatabaseError,
    },

    /// A row does not match the column set of its statement.
    #[error("Row {row} of statement has {found} columns, expected {expected}")]
    ColumnCountMismatch {
        /// 1-based row number within the statement
        row: usize,
        /// Columns in the statement's column set
        expected: usize,
        /// Columns in the offending row
        found: usize,
    },

    /// A later chunk returned different columns than the first one.
    #[error("Column set changed between chunks: expected ({expected}), found ({found})")]
    ColumnSetChanged {
        /// Columns of the first chunk
        expected: String,
        /// Columns of the offending chunk
        found: String,
    },

    /// The skip list removes every column of the result set.
    #[error("Every column of `{0}` is in the skip list")]
    NoColumnsSelected(String),

    /// Schema export is not available for the dialect.
    #[error("Schema export is not supported for {0}")]
    SchemaUnsupported(Dialect),

    /// A schema query failed.
    #[error("Cannot read schema of `{table}`: {source}")]
    SchemaQuery {
        /// Table being exported, or `all` while listing tables
        table: String,
        /// Database error
        #[source]
        source: DatabaseError,
    },

    /// `SHOW CREATE TABLE` returned no create statement.
    #[error("No create statement returned for `{0}`")]
    MissingCreateStatement(String),
}

/// Distinguishable fatal outcomes, each with its own process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureSite {
    /// Anything not classified below
    Unclassified,
    /// Logger could not be installed
    Logger,
    /// `--db-name` missing
    MissingDatabase,
    /// `--db-host` port unparseable
    InvalidHost,
    /// `--db-host` missing
    MissingHost,
    /// `--db-user` missing
    MissingUser,
    /// Schema export without table
    MissingSchemaTable,
    /// Unchunked data export without query file
    MissingQueryFile,
    /// Data export without table
    MissingTable,
    /// Output file could not be created
    OutputOpen,
    /// Output write or flush failed
    OutputWrite,
    /// Query file unreadable
    InputRead,
    /// Query file empty
    EmptyQuery,
    /// Query or decode failure
    Query,
    /// Row does not fit its statement
    RowShape,
    /// Chunks returned different columns
    ColumnSetChanged,
    /// Skip list removed every column
    NoColumnsSelected,
    /// Schema export on an unsupported dialect
    SchemaUnsupported,
    /// MySQL unreachable or login rejected
    MysqlConnect,
    /// PostgreSQL unreachable or login rejected
    PostgresConnect,
}

impl FailureSite {
    /// Process exit code for this failure site.
    pub fn code(self) -> i32 {
        match self {
            FailureSite::Unclassified => 1,
            FailureSite::Logger => 2,
            FailureSite::MissingDatabase => 7,
            FailureSite::MissingHost => 9,
            FailureSite::InvalidHost => 8,
            FailureSite::MissingUser => 10,
            FailureSite::MissingSchemaTable => 12,
            FailureSite::MissingQueryFile => 13,
            FailureSite::MissingTable => 14,
            FailureSite::OutputOpen => 20,
            FailureSite::OutputWrite => 21,
            FailureSite::InputRead => 30,
            FailureSite::EmptyQuery => 31,
            FailureSite::Query => 40,
            FailureSite::RowShape => 41,
            FailureSite::ColumnSetChanged => 42,
            FailureSite::NoColumnsSelected => 43,
            FailureSite::SchemaUnsupported => 50,
            FailureSite::MysqlConnect => 110,
            FailureSite::PostgresConnect => 111,
        }
    }
}

impl From<&ConfigError> for FailureSite {
    fn from(e: &ConfigError) -> Self {
        match e {
            ConfigError::MissingDatabase => FailureSite::MissingDatabase,
            ConfigError::MissingHost => FailureSite::MissingHost,
            ConfigError::InvalidHost(_) => FailureSite::InvalidHost,
            ConfigError::MissingUser => FailureSite::MissingUser,
            ConfigError::MissingSchemaTable => FailureSite::MissingSchemaTable,
            ConfigError::MissingQueryFile => FailureSite::MissingQueryFile,
            ConfigError::MissingTable => FailureSite::MissingTable,
        }
    }
}

impl From<&DatabaseError> for FailureSite {
    fn from(e: &DatabaseError) -> Self {
        match e {
            DatabaseError::ConnectError {
                dialect: Dialect::Mysql,
                ..
            } => FailureSite::MysqlConnect,
            DatabaseError::ConnectError {
                dialect: Dialect::Postgres,
                ..
            } => FailureSite::PostgresConnect,
            DatabaseError::SqlError(_) | DatabaseError::DecodeError { .. } => FailureSite::Query,
        }
    }
}

impl From<&ExportError> for FailureSite {
    fn from(e: &ExportError) -> Self {
        match e {
            ExportError::OutputOpen { .. } => FailureSite::OutputOpen,
            ExportError::OutputWrite(_) => FailureSite::OutputWrite,
            ExportError::InputRead { .. } => FailureSite::InputRead,
            ExportError::EmptyQuery(_) => FailureSite::EmptyQuery,
            ExportError::Query { .. } | ExportError::SchemaQuery { .. } => FailureSite::Query,
            ExportError::ColumnCountMismatch { .. } | ExportError::MissingCreateStatement(_) => {
                FailureSite::RowShape
            }
            ExportError::ColumnSetChanged { .. } => FailureSite::ColumnSetChanged,
            ExportError::NoColumnsSelected(_) => FailureSite::NoColumnsSelected,
            ExportError::SchemaUnsupported(_) => FailureSite::SchemaUnsupported,
        }
    }
}
