//! Query objects returned by the `dsl` entry points.
//!
//! Queries are consuming builders (`self -> Self`) over an immutable context. Building never
//! mutates the query, so the same query can be built for several dialects.

use super::aggregate::IntoSelectItem;
use super::context::{
    ConflictPolicy, DeleteContext, ForUpdate, InsertContext, Join, JoinKind, LockWait, OnConflict,
    Projection, SelectContext, SortItem, UpdateContext, UpdateSet,
};
use super::operand::{IntoOperand, Operand};
use super::scope::{AssignmentScope, Filter, FilterScope};
use crate::builder::{
    BuildStatement, DeleteStatementBuilder, InsertStatementBuilder, SelectStatementBuilder,
    UpdateStatementBuilder,
};
use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::meta::{Column, Entity, Table};
use crate::statement::{BatchStatement, Statement};
use crate::value::Value;
use std::marker::PhantomData;
use std::sync::Arc;

fn run_filter(f: impl FnOnce(&mut FilterScope)) -> Vec<super::Criterion> {
    let mut scope = FilterScope::new();
    f(&mut scope);
    scope.into_criteria()
}

/// A select over one target table, optionally joined.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    ctx: SelectContext,
}

impl SelectQuery {
    pub(crate) fn new(target: &Table) -> Self {
        Self {
            ctx: SelectContext::new(target.clone()),
        }
    }

    pub fn context(&self) -> &SelectContext {
        &self.ctx
    }

    pub fn into_context(self) -> SelectContext {
        self.ctx
    }

    /// Add criteria to the where clause. Repeated calls are joined with `and`.
    pub fn filter(mut self, f: impl FnOnce(&mut FilterScope)) -> Self {
        self.ctx.filter.extend(run_filter(f));
        self
    }

    /// Add the criteria of a reusable filter.
    pub fn filter_by(mut self, filter: &Filter) -> Self {
        self.ctx.filter.extend(filter.criteria().iter().cloned());
        self
    }

    fn join(mut self, kind: JoinKind, table: &Table, on: impl FnOnce(&mut FilterScope)) -> Self {
        self.ctx.joins.push(Join {
            kind,
            table: table.clone(),
            on: run_filter(on),
        });
        self
    }

    pub fn inner_join(self, table: &Table, on: impl FnOnce(&mut FilterScope)) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(self, table: &Table, on: impl FnOnce(&mut FilterScope)) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn order_by(mut self, item: impl Into<SortItem>) -> Self {
        self.ctx.order_by.push(item.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.ctx.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.ctx.offset = Some(offset);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.ctx.distinct = true;
        self
    }

    pub fn for_update(self) -> Self {
        self.for_update_with(LockWait::Wait)
    }

    pub fn for_update_with(mut self, wait: LockWait) -> Self {
        self.ctx.for_update = Some(ForUpdate { wait });
        self
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.ctx.options = Some(options);
        self
    }

    /// Append an item to an explicit select list (replaces "all target columns").
    pub fn add_column<T>(mut self, item: impl IntoSelectItem<T>) -> Self {
        let item = item.into_select_item();
        match &mut self.ctx.projection {
            Projection::AllColumns => self.ctx.projection = Projection::Items(vec![item]),
            Projection::Items(items) => items.push(item),
        }
        self
    }

    /// Project a single item, producing a sub-query usable with `in_subquery` or as a
    /// scalar operand.
    pub fn select<T>(mut self, item: impl IntoSelectItem<T>) -> SubQuery<T> {
        self.ctx.projection = Projection::Items(vec![item.into_select_item()]);
        SubQuery::new(self.ctx)
    }

    /// Project two items, producing a sub-query usable with `in_subquery2`.
    pub fn select_pair<A, B>(
        mut self,
        first: impl IntoSelectItem<A>,
        second: impl IntoSelectItem<B>,
    ) -> SubQuery<(A, B)> {
        self.ctx.projection =
            Projection::Items(vec![first.into_select_item(), second.into_select_item()]);
        SubQuery::new(self.ctx)
    }
}

impl BuildStatement for SelectQuery {
    type Output = Statement;

    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Statement> {
        SelectStatementBuilder::new(dialect, &self.ctx).build(defaults)
    }
}

/// A select whose projection yields values of type `T`.
#[derive(Debug)]
pub struct SubQuery<T> {
    ctx: SelectContext,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SubQuery<T> {
    fn new(ctx: SelectContext) -> Self {
        Self {
            ctx,
            _marker: PhantomData,
        }
    }

    pub fn context(&self) -> &SelectContext {
        &self.ctx
    }
}

impl<T> Clone for SubQuery<T> {
    fn clone(&self) -> Self {
        Self::new(self.ctx.clone())
    }
}

impl<T> BuildStatement for SubQuery<T> {
    type Output = Statement;

    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Statement> {
        SelectStatementBuilder::new(dialect, &self.ctx).build(defaults)
    }
}

/// A query that can be nested inside a criterion.
pub trait IntoSubQuery {
    fn into_context(self) -> Arc<SelectContext>;
}

impl IntoSubQuery for SelectQuery {
    fn into_context(self) -> Arc<SelectContext> {
        Arc::new(self.ctx)
    }
}

impl<T> IntoSubQuery for SubQuery<T> {
    fn into_context(self) -> Arc<SelectContext> {
        Arc::new(self.ctx)
    }
}

/// A single-column sub-query compared like a value: `column = (select ...)`.
impl<T> IntoOperand<T> for SubQuery<T> {
    fn into_operand(self) -> Option<Operand> {
        Some(Operand::SubQuery(Arc::new(self.ctx)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    ctx: DeleteContext,
}

impl DeleteQuery {
    pub(crate) fn new(target: &Table) -> Self {
        Self {
            ctx: DeleteContext {
                target: target.clone(),
                filter: Vec::new(),
                options: None,
            },
        }
    }

    pub fn context(&self) -> &DeleteContext {
        &self.ctx
    }

    pub fn filter(mut self, f: impl FnOnce(&mut FilterScope)) -> Self {
        self.ctx.filter.extend(run_filter(f));
        self
    }

    pub fn filter_by(mut self, filter: &Filter) -> Self {
        self.ctx.filter.extend(filter.criteria().iter().cloned());
        self
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.ctx.options = Some(options);
        self
    }
}

impl BuildStatement for DeleteQuery {
    type Output = Statement;

    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Statement> {
        DeleteStatementBuilder::new(dialect, &self.ctx).build(defaults)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    ctx: UpdateContext,
}

impl UpdateQuery {
    pub(crate) fn new(target: &Table) -> Self {
        Self {
            ctx: UpdateContext {
                target: target.clone(),
                assignments: Vec::new(),
                filter: Vec::new(),
                options: None,
            },
        }
    }

    pub fn context(&self) -> &UpdateContext {
        &self.ctx
    }

    /// Add `set` items.
    pub fn set(mut self, f: impl FnOnce(&mut AssignmentScope)) -> Self {
        let mut scope = AssignmentScope::new();
        f(&mut scope);
        self.ctx.assignments.extend(scope.into_assignments());
        self
    }

    pub fn filter(mut self, f: impl FnOnce(&mut FilterScope)) -> Self {
        self.ctx.filter.extend(run_filter(f));
        self
    }

    pub fn filter_by(mut self, filter: &Filter) -> Self {
        self.ctx.filter.extend(filter.criteria().iter().cloned());
        self
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.ctx.options = Some(options);
        self
    }
}

impl BuildStatement for UpdateQuery {
    type Output = Statement;

    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Statement> {
        UpdateStatementBuilder::new(dialect, &self.ctx).build(defaults)
    }
}

/// An insert, or an upsert once a conflict policy is chosen.
///
/// Rows are supplied last through [`single`](Self::single), [`multiple`](Self::multiple), or
/// [`batch`](Self::batch).
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    ctx: InsertContext,
    build_error: Option<String>,
}

impl InsertQuery {
    pub(crate) fn new(target: &Table) -> Self {
        Self {
            ctx: InsertContext::new(target.clone()),
            build_error: None,
        }
    }

    pub fn context(&self) -> &InsertContext {
        &self.ctx
    }

    fn conflict(mut self, policy: ConflictPolicy) -> Self {
        let keys = self.ctx.conflict.take().map(|c| c.keys).unwrap_or_default();
        self.ctx.conflict = Some(OnConflict { keys, policy });
        self
    }

    /// Update the existing row on conflict (every non-key column by default).
    pub fn on_duplicate_key_update(self) -> Self {
        self.conflict(ConflictPolicy::Update(UpdateSet::AllColumns))
    }

    /// Leave the existing row untouched on conflict.
    pub fn on_duplicate_key_ignore(self) -> Self {
        self.conflict(ConflictPolicy::Ignore)
    }

    /// Add a conflict key column. Without any, the primary key is used.
    pub fn conflict_key<T>(mut self, column: &Column<T>) -> Self {
        match &mut self.ctx.conflict {
            Some(conflict) => conflict.keys.push(column.as_ref().clone()),
            None => {
                self.build_error.get_or_insert_with(|| {
                    "conflict_key() requires on_duplicate_key_update() or on_duplicate_key_ignore()"
                        .to_string()
                });
            }
        }
        self
    }

    /// Replace the default update-all with explicit `set` items.
    pub fn set(mut self, f: impl FnOnce(&mut AssignmentScope)) -> Self {
        let mut scope = AssignmentScope::new();
        f(&mut scope);
        match &mut self.ctx.conflict {
            Some(OnConflict {
                policy: ConflictPolicy::Update(set),
                ..
            }) => match set {
                UpdateSet::Assignments(items) => items.extend(scope.into_assignments()),
                UpdateSet::AllColumns => *set = UpdateSet::Assignments(scope.into_assignments()),
            },
            _ => {
                self.build_error.get_or_insert_with(|| {
                    "set() requires on_duplicate_key_update()".to_string()
                });
            }
        }
        self
    }

    /// Return generated keys from the insert.
    pub fn returning(mut self) -> Self {
        self.ctx.returning = true;
        self
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.ctx.options = Some(options);
        self
    }

    pub fn single(self, row: impl Entity) -> SingleInsert {
        SingleInsert {
            row: row.values(),
            query: self,
        }
    }

    /// All rows in one statement.
    pub fn multiple<E: Entity>(self, rows: impl IntoIterator<Item = E>) -> MultipleInsert {
        MultipleInsert {
            rows: rows.into_iter().map(|r| r.values()).collect(),
            query: self,
        }
    }

    /// One statement, executed once per row.
    pub fn batch<E: Entity>(self, rows: impl IntoIterator<Item = E>) -> BatchInsert {
        BatchInsert {
            rows: rows.into_iter().map(|r| r.values()).collect(),
            query: self,
        }
    }

    fn check(&self) -> SqlResult<()> {
        match &self.build_error {
            Some(message) => Err(SqlError::validation(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleInsert {
    query: InsertQuery,
    row: Vec<Value>,
}

impl BuildStatement for SingleInsert {
    type Output = Statement;

    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Statement> {
        self.query.check()?;
        InsertStatementBuilder::new(dialect, &self.query.ctx).build_single(&self.row, defaults)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipleInsert {
    query: InsertQuery,
    rows: Vec<Vec<Value>>,
}

impl BuildStatement for MultipleInsert {
    type Output = Statement;

    fn build_with(&self, dialect: &dyn Dialect, defaults: &QueryOptions) -> SqlResult<Statement> {
        self.query.check()?;
        InsertStatementBuilder::new(dialect, &self.query.ctx).build_multiple(&self.rows, defaults)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchInsert {
    query: InsertQuery,
    rows: Vec<Vec<Value>>,
}

impl BuildStatement for BatchInsert {
    type Output = BatchStatement;

    fn build_with(
        &self,
        dialect: &dyn Dialect,
        defaults: &QueryOptions,
    ) -> SqlResult<BatchStatement> {
        self.query.check()?;
        InsertStatementBuilder::new(dialect, &self.query.ctx).build_batch(&self.rows, defaults)
    }
}
