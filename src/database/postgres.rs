//! PostgreSQL row decoding.
//!
//! Rows arrive over the simple query protocol, so every value is in its text
//! output form. Types with an exact Rust counterpart are parsed into typed
//! variants; every other type keeps the server's own text, which PostgreSQL
//! accepts back as a literal.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::value::{float_from_f32, Row, SqlValue};
use crate::error_handling::DatabaseError;

/// Decodes one PostgreSQL result row.
///
/// `columns` caches the column names of the result set so every row of one
/// statement shares a single allocation.
pub(super) fn decode_row(
    row: &PgRow,
    columns: &mut Option<Arc<[String]>>,
) -> Result<Row, DatabaseError> {
    let names = columns
        .get_or_insert_with(|| row.columns().iter().map(|c| c.name().to_string()).collect())
        .clone();

    let values = row
        .columns()
        .iter()
        .map(|column| decode_value(row, column))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row::new(names, values))
}

fn decode_value(row: &PgRow, column: &PgColumn) -> Result<SqlValue, DatabaseError> {
    let idx = column.ordinal();
    if row.try_get_raw(idx)?.is_null() {
        return Ok(SqlValue::Null);
    }

    let type_name = column.type_info().name();
    row.try_get_unchecked::<String, _>(idx)
        .and_then(|text| {
            decode_text(type_name, text).map_err(|msg| sqlx::Error::Decode(msg.into()))
        })
        .map_err(|source| DatabaseError::DecodeError {
            column: column.name().to_string(),
            type_name: type_name.to_string(),
            source,
        })
}

/// Parses the text output form of a value of type `type_name`.
///
/// Temporal values outside chrono's range (`infinity`, BC dates, `24:00:00`)
/// stay text.
fn decode_text(type_name: &str, text: String) -> Result<SqlValue, String> {
    let invalid = |text: &str| format!("invalid {type_name} value {text:?}");
    let value = match type_name {
        "BOOL" => match text.as_str() {
            "t" => SqlValue::Bool(true),
            "f" => SqlValue::Bool(false),
            other => return Err(invalid(other)),
        },
        "INT2" | "INT4" | "INT8" => SqlValue::Int(text.parse().map_err(|_| invalid(&text))?),
        "OID" => SqlValue::UInt(text.parse().map_err(|_| invalid(&text))?),
        "FLOAT4" => float_from_f32(text.parse().map_err(|_| invalid(&text))?),
        "FLOAT8" => SqlValue::Float(text.parse().map_err(|_| invalid(&text))?),
        "NUMERIC" => SqlValue::Decimal(text),
        "BYTEA" => {
            let bytes = text
                .strip_prefix("\\x")
                .and_then(|digits| hex::decode(digits).ok())
                .ok_or_else(|| invalid(&text))?;
            SqlValue::Bytes(bytes)
        }
        "DATE" => match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => SqlValue::Date(date),
            Err(_) => SqlValue::Text(text),
        },
        "TIME" => match NaiveTime::parse_from_str(&text, "%H:%M:%S%.f") {
            Ok(time) => SqlValue::Time(time),
            Err(_) => SqlValue::Text(text),
        },
        "TIMESTAMP" => match NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f") {
            Ok(datetime) => SqlValue::DateTime(datetime),
            Err(_) => SqlValue::Text(text),
        },
        "TIMESTAMPTZ" => match DateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f%#z") {
            Ok(ts) => SqlValue::Timestamp(ts.with_timezone(&Utc)),
            Err(_) => SqlValue::Text(text),
        },
        // TEXT, VARCHAR, UUID, JSON, INTERVAL, INET, arrays, ranges, enums
        _ => SqlValue::Text(text),
    };
    Ok(value)
}
