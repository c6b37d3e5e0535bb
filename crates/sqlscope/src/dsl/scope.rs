//! Fluent front-ends that accumulate criteria and assignments.

use super::context::{Assignment, SetValue};
use super::criterion::Criterion;
use super::operand::{IntoOperand, IntoPattern, LikeOption, Operand, PatternPart};
use super::query::{IntoSubQuery, SubQuery};
use crate::meta::Column;
use crate::value::{Bound, SqlParam, Value};
use std::ops::{Add, RangeInclusive};

/// Accumulates criteria for a where clause, a join condition, or a nested group.
///
/// Comparison and LIKE methods skip the criterion entirely when one side is an absent
/// optional literal, so optional search fields need no `if` around them:
///
/// ```ignore
/// from(&e).filter(|s| {
///     s.eq(&e.name, name.as_deref());        // skipped when `name` is None
///     s.greater_eq(&e.salary, min_salary);
/// })
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterScope {
    criteria: Vec<Criterion>,
}

impl FilterScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn into_criteria(self) -> Vec<Criterion> {
        self.criteria
    }

    /// Append a prebuilt criterion.
    pub fn push(&mut self, criterion: Criterion) -> &mut Self {
        self.criteria.push(criterion);
        self
    }

    /// Append every criterion of a reusable [`Filter`].
    pub fn extend(&mut self, filter: &Filter) -> &mut Self {
        self.criteria.extend(filter.criteria.iter().cloned());
        self
    }

    fn compare(
        &mut self,
        left: Option<Operand>,
        right: Option<Operand>,
        node: fn(Operand, Operand) -> Criterion,
    ) -> &mut Self {
        if let (Some(left), Some(right)) = (left, right) {
            self.criteria.push(node(left, right));
        }
        self
    }

    pub fn eq<T: SqlParam>(
        &mut self,
        left: impl IntoOperand<T>,
        right: impl IntoOperand<T>,
    ) -> &mut Self {
        self.compare(left.into_operand(), right.into_operand(), Criterion::Eq)
    }

    pub fn not_eq<T: SqlParam>(
        &mut self,
        left: impl IntoOperand<T>,
        right: impl IntoOperand<T>,
    ) -> &mut Self {
        self.compare(left.into_operand(), right.into_operand(), Criterion::NotEq)
    }

    pub fn less<T: SqlParam>(
        &mut self,
        left: impl IntoOperand<T>,
        right: impl IntoOperand<T>,
    ) -> &mut Self {
        self.compare(left.into_operand(), right.into_operand(), Criterion::Less)
    }

    pub fn less_eq<T: SqlParam>(
        &mut self,
        left: impl IntoOperand<T>,
        right: impl IntoOperand<T>,
    ) -> &mut Self {
        self.compare(left.into_operand(), right.into_operand(), Criterion::LessEq)
    }

    pub fn greater<T: SqlParam>(
        &mut self,
        left: impl IntoOperand<T>,
        right: impl IntoOperand<T>,
    ) -> &mut Self {
        self.compare(left.into_operand(), right.into_operand(), Criterion::Greater)
    }

    pub fn greater_eq<T: SqlParam>(
        &mut self,
        left: impl IntoOperand<T>,
        right: impl IntoOperand<T>,
    ) -> &mut Self {
        self.compare(
            left.into_operand(),
            right.into_operand(),
            Criterion::GreaterEq,
        )
    }

    pub fn is_null<T>(&mut self, column: &Column<T>) -> &mut Self {
        self.criteria.push(Criterion::IsNull(Operand::column(column)));
        self
    }

    pub fn is_not_null<T>(&mut self, column: &Column<T>) -> &mut Self {
        self.criteria
            .push(Criterion::IsNotNull(Operand::column(column)));
        self
    }

    fn like_node(
        &mut self,
        column: &Column<String>,
        pattern: impl IntoPattern,
        node: fn(Operand, Operand, LikeOption) -> Criterion,
    ) -> &mut Self {
        let Some(parts) = pattern.into_pattern().parts else {
            return self;
        };
        let (right, option) = match <[PatternPart; 1]>::try_from(parts) {
            Ok([part]) => (Operand::Parameter(Bound::text(part.text)), part.option),
            Err(parts) => (Operand::Pattern(parts), LikeOption::None),
        };
        self.criteria.push(node(Operand::column(column), right, option));
        self
    }

    /// `column like pattern`. Plain strings are used verbatim; see
    /// [`escape`](super::escape) and friends for literal matching.
    pub fn like(&mut self, column: &Column<String>, pattern: impl IntoPattern) -> &mut Self {
        self.like_node(column, pattern, Criterion::Like)
    }

    pub fn not_like(&mut self, column: &Column<String>, pattern: impl IntoPattern) -> &mut Self {
        self.like_node(column, pattern, Criterion::NotLike)
    }

    pub fn starts_with(
        &mut self,
        column: &Column<String>,
        text: impl super::operand::PatternText,
    ) -> &mut Self {
        self.like(column, super::as_prefix(text))
    }

    pub fn not_starts_with(
        &mut self,
        column: &Column<String>,
        text: impl super::operand::PatternText,
    ) -> &mut Self {
        self.not_like(column, super::as_prefix(text))
    }

    pub fn contains(
        &mut self,
        column: &Column<String>,
        text: impl super::operand::PatternText,
    ) -> &mut Self {
        self.like(column, super::as_infix(text))
    }

    pub fn not_contains(
        &mut self,
        column: &Column<String>,
        text: impl super::operand::PatternText,
    ) -> &mut Self {
        self.not_like(column, super::as_infix(text))
    }

    pub fn ends_with(
        &mut self,
        column: &Column<String>,
        text: impl super::operand::PatternText,
    ) -> &mut Self {
        self.like(column, super::as_suffix(text))
    }

    pub fn not_ends_with(
        &mut self,
        column: &Column<String>,
        text: impl super::operand::PatternText,
    ) -> &mut Self {
        self.not_like(column, super::as_suffix(text))
    }

    pub fn between<T: SqlParam>(&mut self, column: &Column<T>, range: RangeInclusive<T>) -> &mut Self {
        let (start, end) = range.into_inner();
        self.criteria.push(Criterion::Between(
            Operand::column(column),
            (Operand::param(start), Operand::param(end)),
        ));
        self
    }

    pub fn not_between<T: SqlParam>(
        &mut self,
        column: &Column<T>,
        range: RangeInclusive<T>,
    ) -> &mut Self {
        let (start, end) = range.into_inner();
        self.criteria.push(Criterion::NotBetween(
            Operand::column(column),
            (Operand::param(start), Operand::param(end)),
        ));
        self
    }

    /// `column in (...)`. An empty list renders as a predicate that is always false.
    pub fn in_list<T: SqlParam>(
        &mut self,
        column: &Column<T>,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        let values = values.into_iter().map(Operand::param).collect();
        self.criteria
            .push(Criterion::InList(Operand::column(column), values));
        self
    }

    /// `column not in (...)`. An empty list renders as a predicate that is always true.
    pub fn not_in_list<T: SqlParam>(
        &mut self,
        column: &Column<T>,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        let values = values.into_iter().map(Operand::param).collect();
        self.criteria
            .push(Criterion::NotInList(Operand::column(column), values));
        self
    }

    pub fn in_subquery<T>(&mut self, column: &Column<T>, query: SubQuery<T>) -> &mut Self {
        self.criteria.push(Criterion::InSubQuery(
            Operand::column(column),
            query.into_context(),
        ));
        self
    }

    pub fn not_in_subquery<T>(&mut self, column: &Column<T>, query: SubQuery<T>) -> &mut Self {
        self.criteria.push(Criterion::NotInSubQuery(
            Operand::column(column),
            query.into_context(),
        ));
        self
    }

    pub fn in_list2<A: SqlParam, B: SqlParam>(
        &mut self,
        columns: (&Column<A>, &Column<B>),
        values: impl IntoIterator<Item = (A, B)>,
    ) -> &mut Self {
        let values = values
            .into_iter()
            .map(|(a, b)| (Operand::param(a), Operand::param(b)))
            .collect();
        self.criteria.push(Criterion::InList2(
            (Operand::column(columns.0), Operand::column(columns.1)),
            values,
        ));
        self
    }

    pub fn not_in_list2<A: SqlParam, B: SqlParam>(
        &mut self,
        columns: (&Column<A>, &Column<B>),
        values: impl IntoIterator<Item = (A, B)>,
    ) -> &mut Self {
        let values = values
            .into_iter()
            .map(|(a, b)| (Operand::param(a), Operand::param(b)))
            .collect();
        self.criteria.push(Criterion::NotInList2(
            (Operand::column(columns.0), Operand::column(columns.1)),
            values,
        ));
        self
    }

    pub fn in_subquery2<A, B>(
        &mut self,
        columns: (&Column<A>, &Column<B>),
        query: SubQuery<(A, B)>,
    ) -> &mut Self {
        self.criteria.push(Criterion::InSubQuery2(
            (Operand::column(columns.0), Operand::column(columns.1)),
            query.into_context(),
        ));
        self
    }

    pub fn not_in_subquery2<A, B>(
        &mut self,
        columns: (&Column<A>, &Column<B>),
        query: SubQuery<(A, B)>,
    ) -> &mut Self {
        self.criteria.push(Criterion::NotInSubQuery2(
            (Operand::column(columns.0), Operand::column(columns.1)),
            query.into_context(),
        ));
        self
    }

    pub fn exists(&mut self, query: impl IntoSubQuery) -> &mut Self {
        self.criteria.push(Criterion::Exists(query.into_context()));
        self
    }

    pub fn not_exists(&mut self, query: impl IntoSubQuery) -> &mut Self {
        self.criteria.push(Criterion::NotExists(query.into_context()));
        self
    }

    fn group(
        &mut self,
        f: impl FnOnce(&mut FilterScope),
        node: fn(Vec<Criterion>) -> Criterion,
    ) -> &mut Self {
        let mut child = FilterScope::new();
        f(&mut child);
        if !child.is_empty() {
            self.criteria.push(node(child.criteria));
        }
        self
    }

    /// A parenthesized `and` group. Nothing is added when the closure adds nothing.
    pub fn and(&mut self, f: impl FnOnce(&mut FilterScope)) -> &mut Self {
        self.group(f, Criterion::And)
    }

    /// An `or` group. Nothing is added when the closure adds nothing.
    pub fn or(&mut self, f: impl FnOnce(&mut FilterScope)) -> &mut Self {
        self.group(f, Criterion::Or)
    }

    /// A negated group. Nothing is added when the closure adds nothing.
    pub fn not(&mut self, f: impl FnOnce(&mut FilterScope)) -> &mut Self {
        self.group(f, Criterion::Not)
    }
}

/// A reusable list of criteria.
///
/// Filters compose with `+`, which concatenates the lists in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    criteria: Vec<Criterion>,
}

impl Filter {
    pub fn new(f: impl FnOnce(&mut FilterScope)) -> Self {
        let mut scope = FilterScope::new();
        f(&mut scope);
        Self {
            criteria: scope.criteria,
        }
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn into_criteria(self) -> Vec<Criterion> {
        self.criteria
    }
}

impl Add for Filter {
    type Output = Filter;

    fn add(mut self, rhs: Filter) -> Filter {
        self.criteria.extend(rhs.criteria);
        self
    }
}

/// Accumulates `set` items for an update or an upsert.
#[derive(Debug, Clone, Default)]
pub struct AssignmentScope {
    assignments: Vec<Assignment>,
}

impl AssignmentScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }

    fn push(&mut self, column: &crate::meta::ColumnRef, value: SetValue) -> &mut Self {
        self.assignments.push(Assignment {
            column: column.clone(),
            value,
        });
        self
    }

    /// `column = value`. An absent optional value sets NULL.
    pub fn set<T: SqlParam>(&mut self, column: &Column<T>, value: impl IntoOperand<T>) -> &mut Self {
        let value = value.into_operand().unwrap_or(Operand::Parameter(Bound {
            value: Value::Null,
            ty: T::SQL_TYPE,
        }));
        self.push(column.as_ref(), SetValue::Operand(value))
    }

    /// `column = other`, where `other` is a column of the same statement.
    pub fn set_column<T>(&mut self, column: &Column<T>, other: &Column<T>) -> &mut Self {
        self.push(column.as_ref(), SetValue::Operand(Operand::column(other)))
    }

    pub fn set_null<T: SqlParam>(&mut self, column: &Column<T>) -> &mut Self {
        self.push(
            column.as_ref(),
            SetValue::Operand(Operand::Parameter(Bound {
                value: Value::Null,
                ty: T::SQL_TYPE,
            })),
        )
    }

    /// `column = <incoming value of column>` (upsert only).
    pub fn set_excluded<T>(&mut self, column: &Column<T>) -> &mut Self {
        self.push(column.as_ref(), SetValue::Excluded(column.as_ref().clone()))
    }
}
