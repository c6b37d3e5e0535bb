//! Error types for sqlscope

use thiserror::Error;

/// Result type alias for sqlscope operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while building or executing statements.
///
/// Build-time variants (`Unsupported`, `MissingWhereClause`, `UnknownTable`,
/// `Validation`) always reject the whole statement; no partial SQL is returned.
#[derive(Debug, Error)]
pub enum SqlError {
    /// The active dialect has no translation for the requested construct
    #[error("Unsupported by {dialect}: {message}")]
    Unsupported {
        dialect: &'static str,
        message: String,
    },

    /// UPDATE/DELETE without a WHERE clause while the options forbid it
    #[error("Missing WHERE clause: {0}")]
    MissingWhereClause(String),

    /// A column references a table that is not part of any enclosing scope
    #[error("Unknown table reference `{table}` for column `{column}`")]
    UnknownTable { table: String, column: String },

    /// Invalid metamodel or builder input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// The driver reported a negative affected count other than "no info"
    #[error("Execution failed: driver reported affected count {0}")]
    ExecutionFailed(i64),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create an unsupported-construct error for a dialect
    pub fn unsupported(dialect: &'static str, message: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an unsupported-construct error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a tokio_postgres error into a more specific SqlError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                _ => {}
            }
        }
        Self::Query(err)
    }
}
