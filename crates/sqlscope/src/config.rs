//! Configuration values passed in explicitly by the caller.
//!
//! Nothing here is discovered from the environment: an application deserializes a
//! [`DatabaseConfig`] from wherever it keeps settings and hands it to the code that builds
//! statements.

use crate::builder::BuildStatement;
use crate::dialect::{
    Dialect, DryRunDialect, H2Dialect, MySqlDialect, PostgresDialect, SqlServerDialect,
    SqliteDialect,
};
use crate::error::SqlResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-statement build options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// LIKE escape sequence. `None` uses the dialect's default.
    pub escape_sequence: Option<String>,
    /// Allow UPDATE/DELETE without a WHERE clause.
    pub allow_missing_where_clause: bool,
    /// Parameter sets per round trip when executing a batch.
    pub batch_size: usize,
    /// Truncate SQL in log events (in bytes). `None` logs the full text.
    pub max_sql_length: Option<usize>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            escape_sequence: None,
            allow_missing_where_clause: false,
            batch_size: 10,
            max_sql_length: Some(200),
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the LIKE escape sequence.
    pub fn escape_sequence(mut self, escape: impl Into<String>) -> Self {
        self.escape_sequence = Some(escape.into());
        self
    }

    /// Permit UPDATE/DELETE statements that touch every row.
    pub fn allow_missing_where_clause(mut self, allow: bool) -> Self {
        self.allow_missing_where_clause = allow;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}

/// Named dialect, for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    #[default]
    Postgres,
    MySql,
    Sqlite,
    H2,
    SqlServer,
    DryRun,
}

impl DialectKind {
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::Postgres => Arc::new(PostgresDialect),
            DialectKind::MySql => Arc::new(MySqlDialect),
            DialectKind::Sqlite => Arc::new(SqliteDialect),
            DialectKind::H2 => Arc::new(H2Dialect),
            DialectKind::SqlServer => Arc::new(SqlServerDialect),
            DialectKind::DryRun => Arc::new(DryRunDialect),
        }
    }
}

/// Dialect plus default options, injected wherever statements are built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub dialect: DialectKind,
    pub options: QueryOptions,
}

impl DatabaseConfig {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            options: QueryOptions::default(),
        }
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dialect(&self) -> Arc<dyn Dialect> {
        self.dialect.dialect()
    }

    /// Build `query` for the configured dialect, with these options as defaults.
    pub fn build<Q: BuildStatement>(&self, query: &Q) -> SqlResult<Q::Output> {
        query.build_with(&*self.dialect(), &self.options)
    }
}
