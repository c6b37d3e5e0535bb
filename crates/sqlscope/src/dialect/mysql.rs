use super::{Dialect, write_lock_wait};
use crate::builder::upsert::{ConflictSyntax, OnDuplicateKeySyntax};
use crate::dsl::ForUpdate;
use crate::error::SqlResult;
use crate::statement::StatementBuffer;

/// MySQL / MariaDB: backtick quoting, `on duplicate key update` upserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

// Largest row count MySQL accepts; `limit` is mandatory when `offset` is used.
const MAX_ROWS: u64 = u64::MAX;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn write_offset_limit(
        &self,
        buf: &mut StatementBuffer,
        offset: Option<u64>,
        limit: Option<u64>,
        _ordered: bool,
    ) {
        match (limit, offset) {
            (None, None) => {}
            (Some(limit), None) => {
                buf.append(" limit ").append(&limit.to_string());
            }
            (limit, Some(offset)) => {
                buf.append(" limit ")
                    .append(&limit.unwrap_or(MAX_ROWS).to_string())
                    .append(" offset ")
                    .append(&offset.to_string());
            }
        }
    }

    fn write_for_update(&self, buf: &mut StatementBuffer, lock: &ForUpdate) -> SqlResult<()> {
        write_lock_wait(buf, lock);
        Ok(())
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn conflict_syntax(&self) -> &dyn ConflictSyntax {
        &OnDuplicateKeySyntax
    }
}
