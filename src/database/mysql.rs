//! MySQL row decoding.
//!
//! Chunk and file queries run as prepared statements, so values arrive in the
//! binary protocol encoding.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySqlColumn, MySqlRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::value::{float_from_f32, Row, SqlValue};
use crate::error_handling::DatabaseError;

/// How a column's values are read, keyed by the driver's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Int,
    UInt,
    Year,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Time,
    Bytes,
    Text,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "NULL" => ColumnKind::Null,
        name if name.ends_with("UNSIGNED") => ColumnKind::UInt,
        // sqlx reports every TINYINT(1) as BOOLEAN; the column may hold any i8
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Int,
        "YEAR" => ColumnKind::Year,
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "DECIMAL" => ColumnKind::Decimal,
        "DATE" => ColumnKind::Date,
        "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
        "TIME" => ColumnKind::Time,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => ColumnKind::Bytes,
        // CHAR, VARCHAR, *TEXT, ENUM, SET, JSON
        _ => ColumnKind::Text,
    }
}

/// Decodes one MySQL result row.
///
/// `columns` caches the column names of the result set so every row of one
/// statement shares a single allocation.
pub(super) fn decode_row(
    row: &MySqlRow,
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

fn decode_value(row: &MySqlRow, column: &MySqlColumn) -> Result<SqlValue, DatabaseError> {
    let idx = column.ordinal();
    if row.try_get_raw(idx)?.is_null() {
        return Ok(SqlValue::Null);
    }

    let type_name = column.type_info().name();
    let decoded = match column_kind(type_name) {
        ColumnKind::Null => Ok(SqlValue::Null),
        ColumnKind::Int => row.try_get_unchecked::<i64, _>(idx).map(SqlValue::Int),
        ColumnKind::UInt => row.try_get_unchecked::<u64, _>(idx).map(SqlValue::UInt),
        ColumnKind::Year => row
            .try_get_unchecked::<u16, _>(idx)
            .map(|y| SqlValue::UInt(u64::from(y))),
        ColumnKind::Float => row.try_get_unchecked::<f32, _>(idx).map(float_from_f32),
        ColumnKind::Double => row.try_get_unchecked::<f64, _>(idx).map(SqlValue::Float),
        // DECIMAL travels as text in both protocols
        ColumnKind::Decimal => row.try_get_unchecked::<String, _>(idx).map(SqlValue::Decimal),
        kind @ (ColumnKind::Date | ColumnKind::DateTime) => row
            .try_get_unchecked::<Vec<u8>, _>(idx)
            .and_then(|raw| {
                temporal_from_binary(&raw, kind == ColumnKind::DateTime)
                    .map_err(|msg| sqlx::Error::Decode(msg.into()))
            }),
        ColumnKind::Time => row.try_get_unchecked::<MySqlTime, _>(idx).map(time_value),
        ColumnKind::Bytes => row.try_get_unchecked::<Vec<u8>, _>(idx).map(SqlValue::Bytes),
        ColumnKind::Text => row.try_get_unchecked::<String, _>(idx).map(SqlValue::Text),
    };

    decoded.map_err(|source| DatabaseError::DecodeError {
        column: column.name().to_string(),
        type_name: type_name.to_string(),
        source,
    })
}

/// Decodes a binary DATE / DATETIME / TIMESTAMP value.
///
/// `raw` keeps the length byte in front. The server sends a zero length for
/// `0000-00-00`; that value and other dates chrono rejects (`2024-00-00`)
/// are kept as text in the server's notation.
fn temporal_from_binary(raw: &[u8], with_time: bool) -> Result<SqlValue, String> {
    let Some((&len, body)) = raw.split_first() else {
        return Err("empty temporal buffer".to_string());
    };
    let body = body.get(..usize::from(len)).ok_or_else(|| {
        format!("temporal value claims {len} bytes, got {}", body.len())
    })?;

    let (year, month, day) = match body {
        [] => (0, 0, 0),
        [y0, y1, month, day, ..] => (u16::from_le_bytes([*y0, *y1]), *month, *day),
        _ => return Err(format!("expected at least 4 bytes for a date, got {len}")),
    };
    let (hour, minute, second) = match body.get(4..7) {
        Some(&[h, m, s]) => (h, m, s),
        _ => (0, 0, 0),
    };
    let micros = match body.get(7..11) {
        Some(&[a, b, c, d]) => u32::from_le_bytes([a, b, c, d]),
        _ => 0,
    };

    let date = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day));
    if !with_time {
        return Ok(match date {
            Some(date) => SqlValue::Date(date),
            None => SqlValue::Text(format!("{year:04}-{month:02}-{day:02}")),
        });
    }

    let time = NaiveTime::from_hms_micro_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
        micros,
    );
    Ok(match date.zip(time) {
        Some((date, time)) => SqlValue::DateTime(date.and_time(time)),
        None => {
            let mut text =
                format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}");
            if micros != 0 {
                text.push_str(&format!(".{micros:06}"));
            }
            SqlValue::Text(text)
        }
    })
}

/// TIME is an interval in MySQL (`-838:59:59` to `838:59:59`). Only values
/// inside one day map to a time of day.
fn time_value(time: MySqlTime) -> SqlValue {
    let time_of_day = time
        .is_valid_time_of_day()
        .then(|| {
            NaiveTime::from_hms_micro_opt(
                time.hours(),
                u32::from(time.minutes()),
                u32::from(time.seconds()),
                time.microseconds(),
            )
        })
        .flatten();
    match time_of_day {
        Some(t) => SqlValue::Time(t),
        None => SqlValue::Text(time.to_string()),
    }
}
