//! SQL dialects.
//!
//! A [`Dialect`] is a stateless strategy object consulted by every builder: identifier
//! quoting, placeholder syntax, LIKE escaping, pagination and locking syntax, capability
//! flags, and which upsert family (see [`ConflictSyntax`]) the database speaks. Dialects are
//! `Send + Sync` and shared read-only across threads.

mod dry_run;
mod h2;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use dry_run::DryRunDialect;
pub use h2::H2Dialect;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

pub use crate::builder::upsert::ConflictSyntax;

use crate::dsl::{ConflictPolicy, ForUpdate, LockWait};
use crate::error::{SqlError, SqlResult};
use crate::statement::{AffectedCount, StatementBuffer, UpsertOutcome};
use crate::value::Value;
use std::fmt;

/// Dialect-specific SQL behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Short name used in logs and `Unsupported` errors.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote characters.
    fn identifier_quote(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quote an identifier, doubling any embedded closing quote.
    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.identifier_quote();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(open);
        for c in name.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        out
    }

    /// Placeholder text for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Default LIKE escape sequence.
    fn escape_sequence(&self) -> &str {
        "\\"
    }

    /// Escape LIKE wildcards (and the escape sequence itself) in `text`.
    fn escape(&self, text: &str, escape: &str) -> String {
        escape_wildcards(text, escape, &['%', '_'])
    }

    /// Render a value as a literal, for dry-run output only.
    fn format_value(&self, value: &Value) -> String {
        format_literal(value)
    }

    /// Append pagination. `ordered` tells whether an `order by` was already written.
    fn write_offset_limit(
        &self,
        buf: &mut StatementBuffer,
        offset: Option<u64>,
        limit: Option<u64>,
        ordered: bool,
    ) {
        let _ = ordered;
        if let Some(limit) = limit {
            buf.append(" limit ").append(&limit.to_string());
        }
        if let Some(offset) = offset {
            buf.append(" offset ").append(&offset.to_string());
        }
    }

    /// Append the row-locking clause.
    fn write_for_update(&self, buf: &mut StatementBuffer, lock: &ForUpdate) -> SqlResult<()> {
        let _ = (buf, lock);
        Err(SqlError::unsupported(self.name(), "for update"))
    }

    /// Whether `nulls first` / `nulls last` ordering is available.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Whether one INSERT may carry several VALUES rows.
    fn supports_multi_row_insert(&self) -> bool {
        true
    }

    /// Whether generated keys can be retrieved from a batched insert.
    fn supports_batch_generated_keys(&self) -> bool {
        true
    }

    /// Whether INSERT supports a `returning` clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Whether `(a, b) in ((?, ?), ...)` is accepted.
    fn supports_row_value_in_list(&self) -> bool {
        true
    }

    /// Whether `(a, b) in (select x, y ...)` is accepted.
    fn supports_row_value_in_subquery(&self) -> bool {
        true
    }

    /// The upsert family this dialect speaks.
    fn conflict_syntax(&self) -> &dyn ConflictSyntax;

    /// Interpret the affected count reported for one upserted row.
    fn classify_upsert_count(&self, count: AffectedCount, policy: &ConflictPolicy) -> UpsertOutcome {
        self.conflict_syntax().classify(count, policy)
    }
}

pub(crate) fn write_lock_wait(buf: &mut StatementBuffer, lock: &ForUpdate) {
    buf.append(" for update");
    match lock.wait {
        LockWait::Wait => {}
        LockWait::NoWait => {
            buf.append(" nowait");
        }
        LockWait::SkipLocked => {
            buf.append(" skip locked");
        }
    }
}

/// Prefix every occurrence of the escape sequence and of `specials` with `escape`.
pub fn escape_wildcards(text: &str, escape: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if !escape.is_empty() && rest.starts_with(escape) {
            out.push_str(escape);
            out.push_str(escape);
            rest = &rest[escape.len()..];
            continue;
        }
        if specials.contains(&c) {
            out.push_str(escape);
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Quote a string literal, doubling single quotes.
pub fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// ANSI-style literal rendering shared by most dialects.
pub fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::SmallInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        #[cfg(feature = "rust_decimal")]
        Value::Decimal(v) => v.to_string(),
        Value::Text(v) => quote_text(v),
        Value::Bytes(v) => format!("X'{}'", hex(v)),
        Value::Uuid(v) => quote_text(&v.to_string()),
        Value::Date(v) => format!("'{}'", v.format("%Y-%m-%d")),
        Value::Timestamp(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S%.f")),
        Value::TimestampTz(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S%.f%:z")),
        Value::Json(v) => quote_text(&v.to_string()),
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
