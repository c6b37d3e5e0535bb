//! Statement builders.
//!
//! Each builder is a pure function of a context, a [`Dialect`], and [`QueryOptions`]: it
//! assigns aliases, walks the context into a [`StatementBuffer`](crate::StatementBuffer),
//! and either returns a complete statement or an error. There is no partial output.
//!
//! ## Design
//!
//! - Sub-queries render into the same buffer as their parent, so parameters come out in
//!   the order their placeholders appear in the text.
//! - UPDATE and DELETE require a WHERE clause unless the options allow otherwise.
//! - Only LIMIT/OFFSET integers are written into the SQL text; every other value is bound.

pub(crate) mod alias;
mod delete;
mod insert;
mod select;
mod support;
mod update;
pub mod upsert;

pub use delete::DeleteStatementBuilder;
pub use insert::InsertStatementBuilder;
pub use select::SelectStatementBuilder;
pub use update::UpdateStatementBuilder;
pub use upsert::{ConflictSyntax, ExcludedStyle, UpsertWriter};

use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::logging;
use crate::statement::{DryRunStatement, Statement};

/// Something that can be turned into SQL for a dialect.
pub trait BuildStatement {
    type Output;

    /// Build with `defaults` as the options for any query that did not set its own.
    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Self::Output>;

    fn build(&self, dialect: &dyn Dialect) -> SqlResult<Self::Output> {
        self.build_with(dialect, &QueryOptions::default())
    }
}

/// Single-statement queries can also be rendered with literals inlined.
pub trait DryRun: BuildStatement<Output = Statement> {
    fn dry_run(&self, dialect: &dyn Dialect) -> SqlResult<DryRunStatement> {
        Ok(self.build(dialect)?.dry_run(dialect))
    }
}

impl<Q: BuildStatement<Output = Statement>> DryRun for Q {}

pub(crate) fn options_or<'a>(
    own: &'a Option<QueryOptions>,
    defaults: &'a QueryOptions,
) -> &'a QueryOptions {
    own.as_ref().unwrap_or(defaults)
}

pub(crate) fn built(
    kind: &'static str,
    dialect: &dyn Dialect,
    options: &QueryOptions,
    statement: Statement,
) -> Statement {
    logging::log_built(
        kind,
        dialect.name(),
        statement.sql(),
        statement.values().len(),
        options.max_sql_length,
    );
    statement
}

#[cfg(test)]
mod tests;
