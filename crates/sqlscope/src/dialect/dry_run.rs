use super::{Dialect, write_lock_wait};
use crate::builder::upsert::{ConflictSyntax, NoConflictSyntax};
use crate::dsl::ForUpdate;
use crate::error::SqlResult;
use crate::statement::StatementBuffer;

/// ANSI-flavored dialect for inspecting statements without a target database.
///
/// It has no upsert syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunDialect;

impl Dialect for DryRunDialect {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn write_for_update(&self, buf: &mut StatementBuffer, lock: &ForUpdate) -> SqlResult<()> {
        write_lock_wait(buf, lock);
        Ok(())
    }

    fn conflict_syntax(&self) -> &dyn ConflictSyntax {
        &NoConflictSyntax
    }
}
