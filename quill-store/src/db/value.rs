//! Backend-neutral bind values and dispatch helpers
//!
//! sqlx queries are typed by their database. The store picks the backend at
//! runtime, so each statement body is expanded once per pool variant by
//! [`with_pool!`]; inside an arm every query is fully monomorphic.

use chrono::{DateTime, Utc};
use sqlx::{Database, Transaction};
use tracing::warn;

use crate::error::StoreError;

/// A value bound to a `$N` placeholder
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    BigInt(i64),
    Int(i32),
    Text(String),
    NullableText(Option<String>),
    Timestamp(DateTime<Utc>),
}

/// Expand `$body` once per backend with `$conn` bound to the concrete pool.
macro_rules! with_pool {
    ($pool:expr, $conn:ident => $body:expr) => {
        match $pool {
            $crate::db::DbPool::Postgres($conn) => $body,
            $crate::db::DbPool::Sqlite($conn) => $body,
        }
    };
}
pub(crate) use with_pool;

/// Bind every [`Value`] of `$values`, in order, to `$query`.
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                $crate::db::Value::BigInt(v) => query.bind(v),
                $crate::db::Value::Int(v) => query.bind(v),
                $crate::db::Value::Text(v) => query.bind(v),
                $crate::db::Value::NullableText(v) => query.bind(v),
                $crate::db::Value::Timestamp(v) => query.bind(v),
            };
        }
        query
    }};
}
pub(crate) use bind_values;

/// Roll `tx` back after `err`.
///
/// Returns `err` when the rollback succeeds and the rollback failure otherwise.
pub(crate) async fn rollback<DB: Database>(tx: Transaction<'_, DB>, err: StoreError) -> StoreError {
    match tx.rollback().await {
        Ok(()) => err,
        Err(rollback_err) => {
            warn!(error = %err, rollback_error = %rollback_err, "rollback failed");
            StoreError::Transaction(rollback_err)
        }
    }
}
