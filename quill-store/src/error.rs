//! Structured error types for quill-store.
//!
//! Library consumers get a closed taxonomy they can match on; the CLI wraps
//! these in `anyhow` for display.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A lookup matched zero rows. Expected during normal operation.
    #[error("not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    /// A uniqueness, foreign-key, not-null or check constraint rejected a write
    #[error("constraint violation: {message}")]
    ConstraintViolation {
        constraint: Option<String>,
        message: String,
    },

    /// The backend could not be reached
    #[error("cannot reach database: {0}")]
    Connectivity(#[source] sqlx::Error),

    /// Connection acquisition or a caller deadline expired
    #[error("operation timed out")]
    Timeout,

    /// Begin, commit or rollback failed
    #[error("transaction failed: {0}")]
    Transaction(#[source] sqlx::Error),

    /// Creating or dropping a table failed
    #[error("schema error on table '{table}': {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The operation needs a row id that has not been assigned yet
    #[error("{entity} has not been saved yet")]
    NotPersisted { entity: &'static str },

    /// Attaching a label failed; the transaction was rolled back
    #[error("failed to attach label '{name}': {source}")]
    Association {
        name: String,
        #[source]
        source: Box<StoreError>,
    },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Any other driver error
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a not-found error
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Association { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::ConstraintViolation { .. } => true,
            Self::Association { source, .. } => source.is_constraint_violation(),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return Self::ConstraintViolation {
                        constraint: db.constraint().map(str::to_owned),
                        message: db.message().to_owned(),
                    };
                }
                _ => {}
            }
        }

        match err {
            sqlx::Error::RowNotFound => Self::not_found("row", "?"),
            sqlx::Error::PoolTimedOut => Self::Timeout,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => Self::Connectivity(err),
            other => Self::Database(other),
        }
    }
}
