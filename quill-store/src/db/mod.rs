//! Database layer - connection pools, statement builders and the generic repository
//!
//! # Design Principles
//!
//! - One pool per store, no shared connection behind a mutex
//! - Statements are built from a dialect and a record description, never global strings
//! - Rely on DB constraints and `ON CONFLICT`, handle conflicts - no check-then-insert
//! - Transactions for multi-step operations, rollback failures are surfaced

pub mod pool;
pub(crate) mod repo;
pub(crate) mod sql;
mod value;

pub use pool::{DbPool, PoolConfig};
pub(crate) use repo::{Record, Repository};
pub(crate) use value::{bind_values, rollback, with_pool, Value};
