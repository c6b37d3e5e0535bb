//! Convenient imports for typical `sqlscope` usage.
//!
//! ```ignore
//! use sqlscope::prelude::*;
//! ```

pub use crate::dsl::{
    self, as_infix, as_prefix, as_suffix, count, count_all, escape, max, min, outer, text,
};
pub use crate::{
    AffectedCount, BuildStatement, Column, DatabaseConfig, Dialect, DialectKind, DryRun,
    DryRunDialect, Entity, Executor, Filter, FromRow, H2Dialect, MySqlDialect, PostgresDialect,
    QueryOptions, RowExt, SqlError, SqlResult, SqlServerDialect, SqlType, SqliteDialect,
    Statement, Table, TableDef, Value,
};
