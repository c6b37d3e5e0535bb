//! Built statement artifacts.
//!
//! A [`StatementBuffer`] accumulates SQL text and bound values while a builder walks a
//! context. Finishing it against a dialect yields a [`Statement`]: the SQL with
//! dialect-specific placeholders plus the values in placeholder order.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::value::Bound;
use std::fmt;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Param,
}

/// Accumulates SQL text fragments and bound values.
#[derive(Debug, Clone, Default)]
pub struct StatementBuffer {
    parts: Vec<Part>,
    values: Vec<Bound>,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw SQL text.
    pub fn append(&mut self, sql: &str) -> &mut Self {
        match self.parts.last_mut() {
            Some(Part::Text(text)) => text.push_str(sql),
            _ => self.parts.push(Part::Text(sql.to_string())),
        }
        self
    }

    /// Append a placeholder and bind `value` to it.
    pub fn bind(&mut self, value: Bound) -> &mut Self {
        self.parts.push(Part::Param);
        self.values.push(value);
        self
    }

    /// Number of values bound so far.
    pub fn param_count(&self) -> usize {
        self.values.len()
    }

    /// Render placeholders for `dialect` and produce the final statement.
    pub fn finish(self, dialect: &dyn Dialect) -> Statement {
        let mut sql = String::new();
        let mut index = 0;
        for part in &self.parts {
            match part {
                Part::Text(text) => sql.push_str(text),
                Part::Param => {
                    index += 1;
                    sql.push_str(&dialect.placeholder(index));
                }
            }
        }
        Statement {
            sql,
            values: self.values,
            parts: self.parts,
        }
    }
}

/// A parameterized statement: SQL text plus its bound values in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    values: Vec<Bound>,
    parts: Vec<Part>,
}

impl Statement {
    /// A statement with no SQL, produced when there is nothing to do (a multi-row insert of
    /// zero rows). Executors skip it.
    pub fn empty() -> Self {
        Self {
            sql: String::new(),
            values: Vec::new(),
            parts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[Bound] {
        &self.values
    }

    /// Parameters as references for tokio-postgres.
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    /// Inline every bound value as a literal for display.
    ///
    /// The result is for logging and inspection only. It is never executed.
    pub fn dry_run(&self, dialect: &dyn Dialect) -> DryRunStatement {
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = self.values.iter();
        for part in &self.parts {
            match part {
                Part::Text(text) => sql.push_str(text),
                Part::Param => {
                    if let Some(bound) = values.next() {
                        sql.push_str(&dialect.format_value(&bound.value));
                    }
                }
            }
        }
        DryRunStatement {
            sql,
            args: self.values.clone(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// One SQL text executed once per parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatement {
    sql: String,
    rows: Vec<Vec<Bound>>,
    batch_size: usize,
}

impl BatchStatement {
    pub(crate) fn new(sql: String, rows: Vec<Vec<Bound>>, batch_size: usize) -> Self {
        Self {
            sql,
            rows,
            batch_size: batch_size.max(1),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter sets, in input row order.
    pub fn rows(&self) -> &[Vec<Bound>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// How many parameter sets an executor should send per round trip.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Parameter sets grouped by [`BatchStatement::batch_size`].
    pub fn chunks(&self) -> impl Iterator<Item = &[Vec<Bound>]> {
        self.rows.chunks(self.batch_size)
    }
}

/// A statement with its values inlined as literals, plus the original values.
#[derive(Debug, Clone, PartialEq)]
pub struct DryRunStatement {
    pub sql: String,
    pub args: Vec<Bound>,
}

impl fmt::Display for DryRunStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Affected-row count reported for one statement or one batch member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectedCount {
    Rows(u64),
    /// The driver executed the statement but could not report a count.
    Unknown,
}

impl AffectedCount {
    /// Driver sentinel for "succeeded, count unknown".
    pub const SUCCESS_NO_INFO: i64 = -2;

    /// Driver sentinel for "this batch member failed".
    pub const EXECUTE_FAILED: i64 = -3;

    /// Interpret a raw driver count.
    ///
    /// Only [`SUCCESS_NO_INFO`](Self::SUCCESS_NO_INFO) means "unknown"; any other negative
    /// value (including [`EXECUTE_FAILED`](Self::EXECUTE_FAILED)) is an error.
    pub fn from_raw(raw: i64) -> SqlResult<Self> {
        if raw == Self::SUCCESS_NO_INFO {
            return Ok(AffectedCount::Unknown);
        }
        u64::try_from(raw)
            .map(AffectedCount::Rows)
            .map_err(|_| SqlError::ExecutionFailed(raw))
    }

    pub fn rows(self) -> Option<u64> {
        match self {
            AffectedCount::Rows(n) => Some(n),
            AffectedCount::Unknown => None,
        }
    }
}

/// What an upsert did to one row, as far as the dialect's count reporting can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The row was inserted or updated; the dialect reports both as one row.
    InsertedOrUpdated,
    /// A conflicting row existed and was left untouched.
    Unchanged,
    Unknown,
}
