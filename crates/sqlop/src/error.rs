//! Error types for sqlop

use thiserror::Error;

/// Result type alias for sqlop operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types returned while building, executing or binding statements.
#[derive(Debug, Error)]
pub enum SqlError {
    /// An argument is outside the range an operation accepts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No compiling function is registered for an operator kind
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// An operator payload has a shape its compiler cannot render
    #[error("Unsupported payload for operator '{kind}': {message}")]
    UnsupportedPayload { kind: String, message: String },

    /// The binder does not handle this destination type.
    ///
    /// This is the only error a [`ComposedBinder`](crate::binder::ComposedBinder)
    /// skips over; every other error aborts the bind.
    #[error("Unsupported binder destination: {0}")]
    UnsupportedBinder(String),

    /// Value could not be converted into the requested Rust type
    #[error("Cannot convert {from} into {to}")]
    Conversion { from: &'static str, to: &'static str },

    /// Row shape does not match what the destination needs
    #[error("Column count mismatch: expected {expected}, got {got}")]
    ColumnCount { expected: usize, got: usize },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Dialect lookup or registration failure
    #[error("Dialect error: {0}")]
    Dialect(String),

    /// Record plan could not address a field
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an unsupported binder error naming the destination type
    pub fn unsupported_binder(destination: impl Into<String>) -> Self {
        Self::UnsupportedBinder(destination.into())
    }

    /// Create a conversion error
    pub fn conversion(from: &'static str, to: &'static str) -> Self {
        Self::Conversion { from, to }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error only means "try the next binder"
    pub fn is_unsupported_binder(&self) -> bool {
        matches!(self, Self::UnsupportedBinder(_))
    }
}

/// Collapse a "no rows" error into `Ok(None)`.
///
/// ```ignore
/// let user = sqlop::optional(db.query_row(&stmt).await)?;
/// ```
pub fn optional<T>(result: SqlResult<T>) -> SqlResult<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Turn a "no rows" error into `Ok(false)`, any row into `Ok(true)`.
pub fn exists<T>(result: SqlResult<T>) -> SqlResult<bool> {
    optional(result).map(|row| row.is_some())
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
