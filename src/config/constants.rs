//! Configuration constants.
//!
//! This module defines the fixed operational parameters of an export run.

/// Program name written into the header comment of every export.
pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// Number of rows requested per chunk query in chunked data export.
pub const CHUNK_SIZE: u64 = 1000;

/// Default database host when `--db-host` is not given.
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";

/// Port used for MySQL when `--db-host` carries no explicit port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Port used for PostgreSQL when `--db-host` carries no explicit port.
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Default MySQL connection charset.
pub const DEFAULT_CHARSET: &str = "utf8";

/// Table name that selects every table of the database in schema export.
pub const ALL_TABLES: &str = "all";

/// Timestamp layout of the export header comment.
pub const HEADER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
