//! Running built statements.
//!
//! [`Executor`] is the seam between statement building and a database driver. It is
//! implemented here for `tokio_postgres::Client` and `tokio_postgres::Transaction`, so a
//! repository function can take `&impl Executor` and work inside or outside a transaction.
//!
//! ```ignore
//! let statement = dsl::from(&employee).filter(|w| { w.eq(&employee.id, 7); }).build(&PostgresDialect)?;
//! let rows: Vec<Employee> = client
//!     .execute_query(&statement, Employee::from_row)
//!     .await?
//!     .try_collect()
//!     .await?;
//! ```

use crate::error::{SqlError, SqlResult};
use crate::logging;
use crate::statement::{AffectedCount, BatchStatement, Statement};
use futures_core::Stream;
use futures_util::StreamExt;
use futures_util::future::try_join_all;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// Turns one driver row into a value.
pub trait RowDecoder<T>: Send + Sync {
    fn decode(&self, row: &Row) -> SqlResult<T>;
}

impl<T, F> RowDecoder<T> for F
where
    F: Fn(&Row) -> SqlResult<T> + Send + Sync,
{
    fn decode(&self, row: &Row) -> SqlResult<T> {
        self(row)
    }
}

/// Types that know how to read themselves from a row.
///
/// `T::from_row` is itself a [`RowDecoder`], so it can be passed straight to
/// [`Executor::execute_query`].
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> SqlResult<Self>;
}

/// Typed column access with [`SqlError::Decode`] on failure.
pub trait RowExt {
    fn try_get_column<T>(&self, column: &str) -> SqlResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> SqlResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| SqlError::decode(column, e.to_string()))
    }
}

/// A lazily consumed stream of decoded rows.
#[must_use]
pub struct RowStream<T> {
    inner: Pin<Box<dyn Stream<Item = SqlResult<T>> + Send>>,
}

impl<T> RowStream<T> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = SqlResult<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl<T> Stream for RowStream<T> {
    type Item = SqlResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Executes built statements.
pub trait Executor: Send + Sync {
    /// Run a statement and return the affected row count. An empty statement affects no rows.
    fn execute(&self, statement: &Statement) -> impl Future<Output = SqlResult<u64>> + Send;

    /// Run one SQL text once per parameter set, `batch_size` sets per round trip.
    ///
    /// Counts are returned in input order.
    fn execute_batch(
        &self,
        batch: &BatchStatement,
    ) -> impl Future<Output = SqlResult<Vec<AffectedCount>>> + Send;

    /// Run a query and decode its rows as they arrive.
    fn execute_query<T, D>(
        &self,
        statement: &Statement,
        decoder: D,
    ) -> impl Future<Output = SqlResult<RowStream<T>>> + Send
    where
        T: Send + 'static,
        D: RowDecoder<T> + 'static;
}

/// Interpret driver-reported batch counts, warning about members whose count is unknown.
///
/// For drivers that report counts the JDBC way: [`AffectedCount::SUCCESS_NO_INFO`] stands
/// for "succeeded, count unknown", and any other negative count fails the whole batch.
pub fn batch_counts(
    sql: &str,
    raw: impl IntoIterator<Item = i64>,
) -> SqlResult<Vec<AffectedCount>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, n)| {
            let count = AffectedCount::from_raw(n).inspect_err(|_| {
                tracing::error!(
                    target: logging::TARGET,
                    index,
                    raw = n,
                    sql = %logging::truncate_sql(sql, logging::DEFAULT_MAX_SQL_LENGTH),
                    "batch member failed"
                );
            })?;
            if count == AffectedCount::Unknown {
                tracing::warn!(
                    target: logging::TARGET,
                    index,
                    raw = n,
                    sql = %logging::truncate_sql(sql, logging::DEFAULT_MAX_SQL_LENGTH),
                    "batch member reported no affected-row count"
                );
            }
            Ok(count)
        })
        .collect()
}

macro_rules! impl_executor {
    ($ty:ty) => {
        impl Executor for $ty {
            async fn execute(&self, statement: &Statement) -> SqlResult<u64> {
                if statement.is_empty() {
                    return Ok(0);
                }
                logging::log_execute("execute", statement.sql(), statement.values().len());
                <$ty>::execute(self, statement.sql(), &statement.params())
                    .await
                    .map_err(SqlError::from_db_error)
            }

            async fn execute_batch(&self, batch: &BatchStatement) -> SqlResult<Vec<AffectedCount>> {
                logging::log_execute("execute_batch", batch.sql(), batch.len());
                if batch.is_empty() {
                    return Ok(Vec::new());
                }
                let prepared = <$ty>::prepare(self, batch.sql())
                    .await
                    .map_err(SqlError::from_db_error)?;
                let mut counts = Vec::with_capacity(batch.len());
                for chunk in batch.chunks() {
                    let pending = chunk.iter().map(|row| {
                        let prepared = &prepared;
                        async move {
                            let params: Vec<&(dyn ToSql + Sync)> =
                                row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
                            <$ty>::execute(self, prepared, &params)
                                .await
                                .map_err(SqlError::from_db_error)
                        }
                    });
                    counts.extend(try_join_all(pending).await?.into_iter().map(AffectedCount::Rows));
                }
                Ok(counts)
            }

            async fn execute_query<T, D>(
                &self,
                statement: &Statement,
                decoder: D,
            ) -> SqlResult<RowStream<T>>
            where
                T: Send + 'static,
                D: RowDecoder<T> + 'static,
            {
                if statement.is_empty() {
                    return Ok(RowStream::new(futures_util::stream::empty()));
                }
                logging::log_execute("execute_query", statement.sql(), statement.values().len());
                let rows = <$ty>::query_raw(self, statement.sql(), statement.params())
                    .await
                    .map_err(SqlError::from_db_error)?;
                Ok(RowStream::new(rows.map(move |row| match row {
                    Ok(row) => decoder.decode(&row),
                    Err(e) => Err(SqlError::from_db_error(e)),
                })))
            }
        }
    };
}

impl_executor!(tokio_postgres::Client);
impl_executor!(tokio_postgres::Transaction<'_>);
