//! Select-list items: columns, aggregates, and scalar sub-queries.

use super::context::{Aggregate, SelectItem};
use super::query::{IntoSubQuery, SubQuery};
use crate::meta::Column;
use std::marker::PhantomData;

/// An aggregate whose result is read as `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated<T> {
    aggregate: Aggregate,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Aggregated<T> {
    fn new(aggregate: Aggregate) -> Self {
        Self {
            aggregate,
            _marker: PhantomData,
        }
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }
}

/// `count(*)`
pub fn count_all() -> Aggregated<i64> {
    Aggregated::new(Aggregate::CountAll)
}

/// `count(column)`: non-null values only.
pub fn count<T>(column: &Column<T>) -> Aggregated<i64> {
    Aggregated::new(Aggregate::Count(column.as_ref().clone()))
}

pub fn max<T>(column: &Column<T>) -> Aggregated<T> {
    Aggregated::new(Aggregate::Max(column.as_ref().clone()))
}

pub fn min<T>(column: &Column<T>) -> Aggregated<T> {
    Aggregated::new(Aggregate::Min(column.as_ref().clone()))
}

/// Anything that can appear in a select list, yielding values of type `T`.
pub trait IntoSelectItem<T> {
    fn into_select_item(self) -> SelectItem;
}

impl<T> IntoSelectItem<T> for &Column<T> {
    fn into_select_item(self) -> SelectItem {
        SelectItem::Column(self.as_ref().clone())
    }
}

impl<T> IntoSelectItem<T> for Aggregated<T> {
    fn into_select_item(self) -> SelectItem {
        SelectItem::Aggregate(self.aggregate)
    }
}

/// A sub-query in the select list is evaluated once per row of the outer query.
impl<T> IntoSelectItem<T> for SubQuery<T> {
    fn into_select_item(self) -> SelectItem {
        SelectItem::SubQuery(self.into_context())
    }
}
