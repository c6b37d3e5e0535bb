use super::{Dialect, write_lock_wait};
use crate::builder::upsert::{ConflictSyntax, MergeSyntax};
use crate::dsl::ForUpdate;
use crate::error::SqlResult;
use crate::statement::StatementBuffer;

/// H2 2.x: `merge into ... using` upserts.
#[derive(Debug, Default, Clone, Copy)]
pub struct H2Dialect;

static H2_MERGE: MergeSyntax = MergeSyntax { terminated: false };

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn write_for_update(&self, buf: &mut StatementBuffer, lock: &ForUpdate) -> SqlResult<()> {
        write_lock_wait(buf, lock);
        Ok(())
    }

    fn conflict_syntax(&self) -> &dyn ConflictSyntax {
        &H2_MERGE
    }
}
