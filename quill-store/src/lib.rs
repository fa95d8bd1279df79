//! quill-store - persistence for the quill blog backend
//!
//! Users, authors, posts, labels and comments stored in SQLite or PostgreSQL
//! through one shared create/find/update/delete implementation, plus the
//! transactional post/label association.
//!
//! ```no_run
//! # async fn demo() -> quill_store::Result<()> {
//! use quill_store::{Sqlite, Store};
//!
//! let store = Store::open(Sqlite::new("blog.db")).await?;
//! let post = store.find_post_by_id(1).await?;
//! let label = post.add_label("rust").await?;
//! assert_eq!(label.name(), "rust");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod models;
pub mod store;

mod associations;
pub(crate) mod db;
pub(crate) mod schema;

pub use config::{DatabaseConfig, StoreConfig};
pub use db::{DbPool, PoolConfig};
pub use dialect::{Dialect, Driver, Postgres, Sqlite};
pub use error::{Result, StoreError};
pub use models::{Author, Comment, Label, OAuthIdentity, Post, User};
pub use store::{Store, StoreStats};

/// Id carried by an entity that has not been saved yet
pub const TRANSIENT_ID: i64 = -1;
