use super::alias::AliasTree;
use super::support::BuilderSupport;
use super::{built, options_or};
use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::dsl::DeleteContext;
use crate::error::{SqlError, SqlResult};
use crate::statement::Statement;

/// Builds `delete` statements.
pub struct DeleteStatementBuilder<'a> {
    dialect: &'a dyn Dialect,
    ctx: &'a DeleteContext,
}

impl<'a> DeleteStatementBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, ctx: &'a DeleteContext) -> Self {
        Self { dialect, ctx }
    }

    pub fn build(&self, defaults: &QueryOptions) -> SqlResult<Statement> {
        let options = options_or(&self.ctx.options, defaults);
        if self.ctx.filter.is_empty() && !options.allow_missing_where_clause {
            return Err(SqlError::MissingWhereClause(format!(
                "delete from `{}` would affect every row",
                self.ctx.target.def().name().name()
            )));
        }
        let aliases = AliasTree::for_target(&self.ctx.target, self.ctx.sub_queries());
        let mut support = BuilderSupport::new(self.dialect, &aliases, options);
        support.append("delete from ");
        support.write_table_name(&self.ctx.target);
        if !self.ctx.filter.is_empty() {
            support.append(" where ");
            support.write_criteria(AliasTree::ROOT, &self.ctx.filter)?;
        }
        Ok(built("delete", self.dialect, options, support.finish()))
    }
}
