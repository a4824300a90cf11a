//! Dialect-specific escaping of string literals and identifiers.
//!
//! Escaping is not idempotent: escaping an already escaped string escapes the
//! inserted escape characters again.

use crate::config::Dialect;

/// MySQL string escaping: `\` becomes `\\`, `'` becomes `\'`, `"` becomes `\"`.
///
/// Equivalent to replacing backslashes first and quotes second, so quote
/// escapes are never doubled.
pub fn add_slashes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

/// Standard SQL string escaping as used by PostgreSQL: `'` becomes `''`.
pub fn pg_escape(raw: &str) -> String {
    raw.replace('\'', "''")
}

impl Dialect {
    /// Escapes `raw` for embedding between single quotes.
    pub fn escape(self, raw: &str) -> String {
        match self {
            Dialect::Mysql => add_slashes(raw),
            Dialect::Postgres => pg_escape(raw),
        }
    }

    /// Quotes an identifier, each dot-separated part on its own
    /// (`shop.users` becomes `` `shop`.`users` `` for MySQL).
    pub fn quote_identifier(self, name: &str) -> String {
        let quote = match self {
            Dialect::Mysql => '`',
            Dialect::Postgres => '"',
        };
        let doubled = format!("{quote}{quote}");
        name.split('.')
            .map(|part| {
                format!(
                    "{quote}{}{quote}",
                    part.replace(quote, &doubled)
                )
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}
