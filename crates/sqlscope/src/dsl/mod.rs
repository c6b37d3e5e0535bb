//! The query DSL.
//!
//! Statements start from one of the entry points ([`from`], [`insert`], [`update`],
//! [`delete`]) and are refined with consuming builder methods. Conditions are written in
//! closures over a [`FilterScope`]:
//!
//! ```ignore
//! use sqlscope::dsl;
//!
//! let query = dsl::from(&employee)
//!     .inner_join(&address, |on| {
//!         on.eq(&employee.address_id, &address.id);
//!     })
//!     .filter(|w| {
//!         w.greater_eq(&employee.salary, 1000);
//!         w.or(|w| {
//!             w.starts_with(&address.street, "STREET");
//!             w.is_null(&employee.manager_id);
//!         });
//!     })
//!     .order_by(employee.name.desc())
//!     .limit(10);
//! let statement = query.build(&dialect)?;
//! ```

mod aggregate;
mod context;
mod criterion;
mod operand;
mod query;
mod scope;

pub use aggregate::{Aggregated, IntoSelectItem, count, count_all, max, min};
pub use context::{
    Aggregate, Assignment, ConflictPolicy, DeleteContext, ForUpdate, InsertContext, Join,
    JoinKind, LockWait, NullsOrder, OnConflict, Projection, SelectContext, SelectItem, SetValue,
    SortItem, SortOrder, UpdateContext, UpdateSet,
};
pub use criterion::{Criterion, OperandPair};
pub use operand::{
    IntoOperand, IntoPattern, LikeOption, Operand, Outer, Pattern, PatternPart, PatternText,
    as_infix, as_prefix, as_suffix, escape, outer, text,
};
pub use query::{
    BatchInsert, DeleteQuery, InsertQuery, IntoSubQuery, MultipleInsert, SelectQuery,
    SingleInsert, SubQuery, UpdateQuery,
};
pub use scope::{AssignmentScope, Filter, FilterScope};

use crate::meta::Table;

/// `select ... from table`
pub fn from(table: &Table) -> SelectQuery {
    SelectQuery::new(table)
}

/// `insert into table ...`, or an upsert once a conflict policy is set.
pub fn insert(table: &Table) -> InsertQuery {
    InsertQuery::new(table)
}

/// `update table set ...`
pub fn update(table: &Table) -> UpdateQuery {
    UpdateQuery::new(table)
}

/// `delete from table ...`
pub fn delete(table: &Table) -> DeleteQuery {
    DeleteQuery::new(table)
}
