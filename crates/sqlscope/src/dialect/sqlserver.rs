use super::{Dialect, escape_wildcards};
use crate::builder::upsert::{ConflictSyntax, MergeSyntax};
use crate::statement::StatementBuffer;
use crate::value::Value;

/// Microsoft SQL Server: bracket quoting, `offset ... fetch` pagination, `merge` upserts.
///
/// Row locking uses table hints, which this builder does not emit, so `for update` is
/// rejected. Row values are not supported at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerDialect;

static SQL_SERVER_MERGE: MergeSyntax = MergeSyntax { terminated: true };

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('[', ']')
    }

    // `[` opens a character class in T-SQL LIKE patterns.
    fn escape(&self, text: &str, escape: &str) -> String {
        escape_wildcards(text, escape, &['%', '_', '['])
    }

    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Bool(v) => (if *v { "1" } else { "0" }).to_string(),
            Value::Text(v) => format!("N{}", super::quote_text(v)),
            other => super::format_literal(other),
        }
    }

    fn write_offset_limit(
        &self,
        buf: &mut StatementBuffer,
        offset: Option<u64>,
        limit: Option<u64>,
        ordered: bool,
    ) {
        if offset.is_none() && limit.is_none() {
            return;
        }
        if !ordered {
            buf.append(" order by (select null)");
        }
        buf.append(" offset ")
            .append(&offset.unwrap_or(0).to_string())
            .append(" rows");
        if let Some(limit) = limit {
            buf.append(" fetch next ")
                .append(&limit.to_string())
                .append(" rows only");
        }
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_batch_generated_keys(&self) -> bool {
        false
    }

    fn supports_row_value_in_list(&self) -> bool {
        false
    }

    fn supports_row_value_in_subquery(&self) -> bool {
        false
    }

    fn conflict_syntax(&self) -> &dyn ConflictSyntax {
        &SQL_SERVER_MERGE
    }
}
