//! `tracing` events for built and executed statements.
//!
//! Everything is emitted on the `sqlscope.sql` target so it can be filtered independently
//! of application logs.

pub(crate) const TARGET: &str = "sqlscope.sql";

/// Default truncation applied when no options are at hand.
pub(crate) const DEFAULT_MAX_SQL_LENGTH: Option<usize> = Some(200);

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

pub(crate) fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

pub(crate) fn log_built(
    kind: &'static str,
    dialect: &'static str,
    sql: &str,
    param_count: usize,
    max_sql_length: Option<usize>,
) {
    tracing::debug!(
        target: TARGET,
        kind,
        dialect,
        param_count,
        sql = %truncate_sql(sql, max_sql_length),
        "statement built"
    );
}

pub(crate) fn log_execute(operation: &'static str, sql: &str, param_count: usize) {
    tracing::debug!(
        target: TARGET,
        operation,
        param_count,
        sql = %truncate_sql(sql, DEFAULT_MAX_SQL_LENGTH),
        "executing"
    );
}
