//! Database-independent row and value model.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// A single column value decoded from a result row.
///
/// The source schema is unknown at compile time, so drivers inspect the
/// reported column type and pick the variant that keeps enough information
/// for a faithful text rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Boolean column
    Bool(bool),
    /// Signed integer of any width
    Int(i64),
    /// Unsigned integer of any width (MySQL `UNSIGNED`)
    UInt(u64),
    /// Floating-point column
    Float(f64),
    /// Exact numeric, kept as its decimal text
    Decimal(String),
    /// Character data (also JSON, UUID and enum values)
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// Point in time normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Whether the value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Natural text form of the value, `None` for NULL.
    ///
    /// Numbers use decimal notation and temporal values ISO notation. Binary
    /// data is decoded as UTF-8 with replacement characters; booleans render
    /// as `true`/`false`.
    pub fn to_plain_text(&self) -> Option<String> {
        let text = match self {
            SqlValue::Null => return None,
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::UInt(u) => u.to_string(),
            SqlValue::Float(f) => format_float(*f),
            SqlValue::Decimal(d) => d.clone(),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            SqlValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            SqlValue::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            SqlValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            SqlValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f+00:00").to_string(),
        };
        Some(text)
    }
}

/// Widens a single-precision float without exposing binary noise
/// (`0.1f32` stays `0.1` rather than `0.10000000149011612`).
pub(crate) fn float_from_f32(v: f32) -> SqlValue {
    SqlValue::Float(v.to_string().parse::<f64>().unwrap_or(f64::from(v)))
}

/// Shortest round-trip decimal form; non-finite values use the spelling both
/// MySQL and PostgreSQL accept in string literals.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

/// One result row: column names paired positionally with values.
///
/// Column names are shared between the rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row. Callers normally pass one value per column; a mismatch
    /// is reported when the row is materialized.
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Column names in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in result order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Value of the first column with the given name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }
}
