use super::alias::AliasTree;
use super::support::BuilderSupport;
use super::{built, options_or};
use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::dsl::{SetValue, UpdateContext};
use crate::error::{SqlError, SqlResult};
use crate::statement::Statement;

/// Builds `update` statements.
pub struct UpdateStatementBuilder<'a> {
    dialect: &'a dyn Dialect,
    ctx: &'a UpdateContext,
}

impl<'a> UpdateStatementBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, ctx: &'a UpdateContext) -> Self {
        Self { dialect, ctx }
    }

    pub fn build(&self, defaults: &QueryOptions) -> SqlResult<Statement> {
        let options = options_or(&self.ctx.options, defaults);
        let table = self.ctx.target.def().name().name();
        if self.ctx.assignments.is_empty() {
            return Err(SqlError::validation(format!(
                "update of `{table}` has no set items"
            )));
        }
        if self.ctx.filter.is_empty() && !options.allow_missing_where_clause {
            return Err(SqlError::MissingWhereClause(format!(
                "update of `{table}` would affect every row"
            )));
        }

        let aliases = AliasTree::for_target(&self.ctx.target, self.ctx.sub_queries());
        let mut support = BuilderSupport::new(self.dialect, &aliases, options);
        support.append("update ");
        support.write_table_name(&self.ctx.target);
        support.append(" set ");
        for (i, assignment) in self.ctx.assignments.iter().enumerate() {
            if assignment.column.table_id() != self.ctx.target.id() {
                return Err(SqlError::validation(format!(
                    "cannot set `{}`: it belongs to another table reference",
                    assignment.column.name().name()
                )));
            }
            if i > 0 {
                support.append(", ");
            }
            support.write_column_name(&assignment.column);
            support.append(" = ");
            match &assignment.value {
                SetValue::Operand(operand) => support.write_operand(AliasTree::ROOT, operand)?,
                SetValue::Excluded(_) => {
                    return Err(SqlError::validation(
                        "excluded values are only available in an upsert",
                    ));
                }
            }
        }
        if !self.ctx.filter.is_empty() {
            support.append(" where ");
            support.write_criteria(AliasTree::ROOT, &self.ctx.filter)?;
        }
        Ok(built("update", self.dialect, options, support.finish()))
    }
}
