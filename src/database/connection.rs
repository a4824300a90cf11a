//! Connection establishment and the driver-backed [`RowSource`].

use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use log::{debug, info};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::query::Query;
use sqlx::{ConnectOptions, Connection};

use super::value::Row;
use super::{mysql, postgres, RowSource};
use crate::config::{Config, Dialect};
use crate::error_handling::DatabaseError;

/// A single live connection to the source database.
///
/// One connection serves the whole run; statements on it run strictly one
/// after another.
pub enum DbConnection {
    /// MySQL / MariaDB connection
    MySql(MySqlConnection),
    /// PostgreSQL connection
    Postgres(PgConnection),
}

impl DbConnection {
    /// Dialect of the connected server.
    pub fn dialect(&self) -> Dialect {
        match self {
            DbConnection::MySql(_) => Dialect::Mysql,
            DbConnection::Postgres(_) => Dialect::Postgres,
        }
    }

    /// Closes the connection, letting the server release the session.
    pub async fn close(self) -> Result<(), DatabaseError> {
        match self {
            DbConnection::MySql(conn) => conn.close().await?,
            DbConnection::Postgres(conn) => conn.close().await?,
        }
        Ok(())
    }
}

/// Opens a connection to the database described by `config`.
///
/// # Errors
///
/// Returns a [`crate::error_handling::ConfigError`] for an unparseable host and
/// [`DatabaseError::ConnectError`] when the server cannot be reached or
/// rejects the login.
pub async fn connect(config: &Config) -> Result<DbConnection> {
    let (host, port) = config.host_and_port()?;
    let dialect = config.db_type;
    info!(
        "Connecting to {} at {}:{} (database `{}`, user `{}`)",
        dialect, host, port, config.db_name, config.db_user
    );

    let connect_error = |source| DatabaseError::ConnectError {
        dialect,
        host: host.clone(),
        port,
        source,
    };

    let conn = match dialect {
        Dialect::Mysql => {
            let options = MySqlConnectOptions::new()
                .host(&host)
                .port(port)
                .username(&config.db_user)
                .password(&config.db_pwd)
                .database(&config.db_name)
                .charset(&config.db_charset);
            DbConnection::MySql(options.connect().await.map_err(connect_error)?)
        }
        Dialect::Postgres => {
            let options = PgConnectOptions::new()
                .host(&host)
                .port(port)
                .username(&config.db_user)
                .password(&config.db_pwd)
                .database(&config.db_name)
                .options([("bytea_output", "hex")]);
            DbConnection::Postgres(options.connect().await.map_err(connect_error)?)
        }
    };

    debug!("Connected to {}", dialect);
    Ok(conn)
}

impl RowSource for DbConnection {
    fn count_rows<'a>(&'a mut self, table: &'a str) -> BoxFuture<'a, Result<u64, DatabaseError>> {
        Box::pin(async move {
            let sql = format!("SELECT COUNT(*) AS total FROM {table}");
            let total: i64 = match self {
                DbConnection::MySql(conn) => sqlx::query_scalar(&sql).fetch_one(conn).await?,
                DbConnection::Postgres(conn) => sqlx::query_scalar(&sql).fetch_one(conn).await?,
            };
            // COUNT(*) is never negative
            Ok(u64::try_from(total).unwrap_or_default())
        })
    }

    fn fetch_rows<'a>(&'a mut self, sql: &'a str) -> BoxStream<'a, Result<Row, DatabaseError>> {
        match self {
            DbConnection::MySql(conn) => {
                let mut columns = None;
                unprepared_query(sql)
                    .fetch(conn)
                    .map(move |row| mysql::decode_row(&row?, &mut columns))
                    .boxed()
            }
            // simple query protocol: every value arrives in its text form
            DbConnection::Postgres(conn) => {
                let mut columns = None;
                sqlx::raw_sql(sql)
                    .fetch(conn)
                    .map(move |row| postgres::decode_row(&row?, &mut columns))
                    .boxed()
            }
        }
    }
}

/// Prepared statement that is closed after use instead of entering the
/// connection's statement cache. Every chunk has its own SQL, and cached
/// statements count toward the server's `max_prepared_stmt_count`.
fn unprepared_query(sql: &str) -> Query<'_, MySql, MySqlArguments> {
    sqlx::query(sql).persistent(false)
}
