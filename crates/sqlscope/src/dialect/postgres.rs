use super::{Dialect, format_literal, hex, write_lock_wait};
use crate::builder::upsert::{ConflictSyntax, OnConflictSyntax};
use crate::dsl::ForUpdate;
use crate::error::SqlResult;
use crate::statement::StatementBuffer;
use crate::value::Value;

/// PostgreSQL: `$n` placeholders, `on conflict` upserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Bytes(v) => format!("'\\x{}'", hex(v)),
            other => format_literal(other),
        }
    }

    fn write_for_update(&self, buf: &mut StatementBuffer, lock: &ForUpdate) -> SqlResult<()> {
        write_lock_wait(buf, lock);
        Ok(())
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn conflict_syntax(&self) -> &dyn ConflictSyntax {
        &OnConflictSyntax
    }
}
