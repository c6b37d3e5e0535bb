use super::Dialect;
use crate::builder::upsert::{ConflictSyntax, OnConflictSyntax};
use crate::statement::StatementBuffer;

/// SQLite 3.35+.
///
/// Row locking does not exist, and a row-value `in` needs a sub-query on its right side.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
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
            (Some(limit), offset) => {
                buf.append(" limit ").append(&limit.to_string());
                if let Some(offset) = offset {
                    buf.append(" offset ").append(&offset.to_string());
                }
            }
            (None, Some(offset)) => {
                buf.append(" limit -1 offset ").append(&offset.to_string());
            }
        }
    }

    fn supports_batch_generated_keys(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_row_value_in_list(&self) -> bool {
        false
    }

    fn conflict_syntax(&self) -> &dyn ConflictSyntax {
        &OnConflictSyntax
    }
}
