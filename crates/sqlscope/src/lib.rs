//! # sqlscope
//!
//! Type-safe, multi-dialect SQL statement building.
//!
//! ## Features
//!
//! - **Declarative filters**: conditions are written in closures over a [`FilterScope`];
//!   comparisons against absent optional values are skipped, so optional search fields
//!   need no branching
//! - **Parameterized output**: every user value is bound; only LIMIT/OFFSET integers appear
//!   in the SQL text
//! - **Dialects**: PostgreSQL, MySQL, SQLite, H2, SQL Server, plus a dry-run dialect for
//!   inspection
//! - **Upserts**: `on conflict`, `on duplicate key update`, and `merge` from one description
//! - **Safe defaults**: UPDATE/DELETE without WHERE are rejected unless explicitly allowed
//!
//! ## Example
//!
//! ```ignore
//! use sqlscope::prelude::*;
//!
//! let employee = TableDef::builder("employee")
//!     .identity("id", SqlType::Int)
//!     .column("name", SqlType::Text)
//!     .column("salary", SqlType::Int)
//!     .build()?;
//! let name = employee.column::<String>("name")?;
//! let salary = employee.column::<i32>("salary")?;
//!
//! let min_salary: Option<i32> = None;
//! let statement = dsl::from(&employee)
//!     .filter(|w| {
//!         w.starts_with(&name, "A");
//!         w.greater_eq(&salary, min_salary); // skipped
//!     })
//!     .order_by(name.asc())
//!     .build(&PostgresDialect)?;
//!
//! assert_eq!(
//!     statement.sql(),
//!     "select employee.id, employee.name, employee.salary from employee \
//!      where employee.name like $1 escape $2 order by employee.name asc"
//! );
//! ```

pub mod builder;
pub mod config;
pub mod dialect;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod ident;
pub mod meta;
pub mod prelude;
pub mod statement;
pub mod value;

mod logging;

pub use builder::{BuildStatement, DryRun};
pub use config::{DatabaseConfig, DialectKind, QueryOptions};
pub use dialect::{
    Dialect, DryRunDialect, H2Dialect, MySqlDialect, PostgresDialect, SqlServerDialect,
    SqliteDialect,
};
pub use dsl::{Filter, FilterScope};
pub use error::{SqlError, SqlResult};
pub use executor::{Executor, FromRow, RowDecoder, RowExt, RowStream};
pub use ident::Ident;
pub use meta::{Column, ColumnDef, ColumnRef, Entity, Generation, Table, TableDef};
pub use statement::{
    AffectedCount, BatchStatement, DryRunStatement, Statement, StatementBuffer, UpsertOutcome,
};
pub use value::{Bound, SqlParam, SqlType, Value};
