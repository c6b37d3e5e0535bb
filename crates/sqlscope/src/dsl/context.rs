//! Immutable descriptions of statements, consumed by the builders.

use super::criterion::Criterion;
use super::operand::Operand;
use crate::config::QueryOptions;
use crate::meta::{Column, ColumnRef, Table};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Table,
    pub on: Vec<Criterion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// One `order by` item.
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub column: ColumnRef,
    pub order: SortOrder,
    pub nulls: Option<NullsOrder>,
}

impl SortItem {
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}

impl<T> Column<T> {
    pub fn asc(&self) -> SortItem {
        SortItem {
            column: self.as_ref().clone(),
            order: SortOrder::Asc,
            nulls: None,
        }
    }

    pub fn desc(&self) -> SortItem {
        SortItem {
            column: self.as_ref().clone(),
            order: SortOrder::Desc,
            nulls: None,
        }
    }
}

impl<T> From<&Column<T>> for SortItem {
    fn from(column: &Column<T>) -> Self {
        column.asc()
    }
}

/// Aggregate function over the rows of one query level.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// `count(*)`
    CountAll,
    Count(ColumnRef),
    Max(ColumnRef),
    Min(ColumnRef),
}

/// One item of an explicit select list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Column(ColumnRef),
    Aggregate(Aggregate),
    /// Scalar sub-query. It must select exactly one column.
    SubQuery(Arc<SelectContext>),
}

/// The select list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Projection {
    /// Every column of the target table.
    #[default]
    AllColumns,
    Items(Vec<SelectItem>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockWait {
    #[default]
    Wait,
    NoWait,
    SkipLocked,
}

/// Row-locking clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForUpdate {
    pub wait: LockWait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectContext {
    pub target: Table,
    pub joins: Vec<Join>,
    pub filter: Vec<Criterion>,
    pub projection: Projection,
    pub distinct: bool,
    pub order_by: Vec<SortItem>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub for_update: Option<ForUpdate>,
    pub options: Option<QueryOptions>,
}

impl SelectContext {
    pub fn new(target: Table) -> Self {
        Self {
            target,
            joins: Vec::new(),
            filter: Vec::new(),
            projection: Projection::AllColumns,
            distinct: false,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            for_update: None,
            options: None,
        }
    }

    /// Tables introduced by this query level, in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        std::iter::once(&self.target).chain(self.joins.iter().map(|j| &j.table))
    }

    /// Criteria owned by this query level: join conditions first, then the where clause.
    pub fn criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.joins
            .iter()
            .flat_map(|j| j.on.iter())
            .chain(self.filter.iter())
    }

    /// Number of columns the select list yields.
    pub fn width(&self) -> usize {
        match &self.projection {
            Projection::AllColumns => self.target.def().columns().len(),
            Projection::Items(items) => items.len(),
        }
    }

    /// Sub-queries nested directly in this level, in the order they appear in the SQL.
    pub fn sub_queries(&self) -> Vec<&Arc<SelectContext>> {
        let mut out = Vec::new();
        if let Projection::Items(items) = &self.projection {
            out.extend(items.iter().filter_map(|item| match item {
                SelectItem::SubQuery(sub) => Some(sub),
                _ => None,
            }));
        }
        for criterion in self.criteria() {
            criterion.collect_sub_queries(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteContext {
    pub target: Table,
    pub filter: Vec<Criterion>,
    pub options: Option<QueryOptions>,
}

impl DeleteContext {
    pub fn sub_queries(&self) -> Vec<&Arc<SelectContext>> {
        let mut out = Vec::new();
        for criterion in &self.filter {
            criterion.collect_sub_queries(&mut out);
        }
        out
    }
}

/// Right-hand side of a `set` item.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    Operand(Operand),
    /// The value the conflicting insert row carried for this column (upsert only).
    Excluded(ColumnRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: SetValue,
}

impl Assignment {
    pub fn sub_query(&self) -> Option<&Arc<SelectContext>> {
        match &self.value {
            SetValue::Operand(operand) => operand.sub_query(),
            SetValue::Excluded(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateContext {
    pub target: Table,
    pub assignments: Vec<Assignment>,
    pub filter: Vec<Criterion>,
    pub options: Option<QueryOptions>,
}

impl UpdateContext {
    /// Sub-queries of the `set` items, then of the where clause.
    pub fn sub_queries(&self) -> Vec<&Arc<SelectContext>> {
        let mut out: Vec<_> = self
            .assignments
            .iter()
            .filter_map(Assignment::sub_query)
            .collect();
        for criterion in &self.filter {
            criterion.collect_sub_queries(&mut out);
        }
        out
    }
}

/// Which columns an upsert overwrites when the row already exists.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UpdateSet {
    /// Every non-identity, non-key column, from the incoming row.
    #[default]
    AllColumns,
    Assignments(Vec<Assignment>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictPolicy {
    Update(UpdateSet),
    Ignore,
}

/// Conflict handling that turns an insert into an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// Conflict target columns. Empty means the primary key.
    pub keys: Vec<ColumnRef>,
    pub policy: ConflictPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertContext {
    pub target: Table,
    pub conflict: Option<OnConflict>,
    /// Return generated key columns from the insert.
    pub returning: bool,
    pub options: Option<QueryOptions>,
}

impl InsertContext {
    pub fn new(target: Table) -> Self {
        Self {
            target,
            conflict: None,
            returning: false,
            options: None,
        }
    }

    /// Sub-queries used by the upsert `set` items.
    pub fn sub_queries(&self) -> Vec<&Arc<SelectContext>> {
        match &self.conflict {
            Some(OnConflict {
                policy: ConflictPolicy::Update(UpdateSet::Assignments(items)),
                ..
            }) => items.iter().filter_map(Assignment::sub_query).collect(),
            _ => Vec::new(),
        }
    }
}
