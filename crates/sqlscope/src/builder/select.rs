use super::alias::AliasTree;
use super::support::BuilderSupport;
use super::{built, options_or};
use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::dsl::SelectContext;
use crate::error::SqlResult;
use crate::statement::Statement;

/// Builds `select` statements, sub-queries included.
pub struct SelectStatementBuilder<'a> {
    dialect: &'a dyn Dialect,
    ctx: &'a SelectContext,
}

impl<'a> SelectStatementBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, ctx: &'a SelectContext) -> Self {
        Self { dialect, ctx }
    }

    pub fn build(&self, defaults: &QueryOptions) -> SqlResult<Statement> {
        let options = options_or(&self.ctx.options, defaults);
        let aliases = AliasTree::for_select(self.ctx);
        let mut support = BuilderSupport::new(self.dialect, &aliases, options);
        support.write_select(AliasTree::ROOT, self.ctx)?;
        Ok(built("select", self.dialect, options, support.finish()))
    }
}
