//! Store - connection lifecycle, entity factories and finders
//!
//! A [`Store`] is a cheap handle: cloning it shares the dialect and the pool.
//! Entities carry a clone so their `save`/`destroy` calls reach the same backend.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::StoreConfig;
use crate::db::{pool, DbPool, PoolConfig, Repository, Value};
use crate::dialect::Dialect;
use crate::error::{Result, StoreError};
use crate::models::{Author, Comment, Label, OAuthIdentity, Post, User};
use crate::schema;

/// Shared handle to one backend
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    dialect: Box<dyn Dialect>,
    pool: DbPool,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub users: i64,
    pub authors: i64,
    pub posts: i64,
    pub labels: i64,
    pub comments: i64,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("dialect", &self.inner.dialect)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Connect with default pool settings and create the schema.
    pub async fn open(dialect: impl Dialect + 'static) -> Result<Self> {
        Self::open_with(dialect, PoolConfig::default()).await
    }

    /// Connect, validate connectivity, then create all tables.
    ///
    /// Fails fast: if the backend is unreachable or any table cannot be
    /// created, no store is returned.
    pub async fn open_with(dialect: impl Dialect + 'static, config: PoolConfig) -> Result<Self> {
        Self::open_boxed(Box::new(dialect), config).await
    }

    /// Build the dialect and pool from configuration
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::open_boxed(config.database.dialect()?, config.pool.clone()).await
    }

    #[instrument(skip_all, fields(driver = %dialect.driver()))]
    async fn open_boxed(dialect: Box<dyn Dialect>, config: PoolConfig) -> Result<Self> {
        let pool = pool::connect(dialect.as_ref(), &config).await?;
        pool::ping(&pool).await?;
        schema::create_all(dialect.as_ref(), &pool).await?;

        info!(
            driver = %dialect.driver(),
            max_connections = config.max_connections,
            "store opened"
        );

        Ok(Self {
            inner: Arc::new(StoreInner { dialect, pool }),
        })
    }

    /// Drop every table in reverse dependency order.
    ///
    /// WARNING: all data is lost. Meant for test environments.
    #[instrument(skip(self))]
    pub async fn teardown(&self) -> Result<()> {
        schema::drop_all(&self.inner.pool).await
    }

    /// Close the pool; outstanding entity handles fail afterwards
    pub async fn close(&self) {
        self.inner.pool.close().await;
        info!(driver = %self.inner.dialect.driver(), "store closed");
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.inner.dialect.as_ref()
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.inner.pool
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            users: Repository::<User>::new(self).count().await?,
            authors: Repository::<Author>::new(self).count().await?,
            posts: Repository::<Post>::new(self).count().await?,
            labels: Repository::<Label>::new(self).count().await?,
            comments: Repository::<Comment>::new(self).count().await?,
        })
    }

    // ========================================================================
    // Factories - transient entities, no I/O
    // ========================================================================

    pub fn new_user(
        &self,
        username: impl Into<String>,
        email: impl Into<String>,
        registration_date: DateTime<Utc>,
        timezone: i32,
        oauth: OAuthIdentity,
    ) -> User {
        User::transient(
            self.clone(),
            username.into(),
            email.into(),
            registration_date,
            timezone,
            oauth,
        )
    }

    pub fn new_author(&self, user: &User, twitter: Option<String>) -> Author {
        Author::transient(self.clone(), user.clone(), twitter)
    }

    pub fn new_post(
        &self,
        author: &Author,
        title: impl Into<String>,
        content: impl Into<String>,
        image_url: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Post {
        Post::transient(
            self.clone(),
            author.clone(),
            title.into(),
            content.into(),
            image_url.into(),
            date,
        )
    }

    pub fn new_label(&self, name: impl Into<String>) -> Label {
        Label::transient(self.clone(), name.into())
    }

    pub fn new_comment(
        &self,
        user: &User,
        post: &Post,
        content: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Comment {
        Comment::transient(self.clone(), user.id(), post.id(), content.into(), date)
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn find_user_by_id(&self, id: i64) -> Result<User> {
        Repository::new(self).find_by_id(id).await
    }

    pub async fn find_all_users(&self) -> Result<Vec<User>> {
        Repository::new(self).find_all().await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<User> {
        Repository::new(self)
            .find_one("u.username", Value::Text(username.to_owned()))
            .await
    }

    /// Lookup used on OAuth login to recognise a returning user.
    ///
    /// Ids are only unique per provider, so both must match.
    pub async fn find_user_by_oauth_id(&self, provider: &str, oauth_id: i64) -> Result<User> {
        Repository::new(self)
            .find_first(
                &["u.oauth_provider", "u.oauth_id"],
                vec![Value::Text(provider.to_owned()), Value::BigInt(oauth_id)],
            )
            .await
    }

    // ========================================================================
    // Authors
    // ========================================================================

    pub async fn find_author_by_id(&self, id: i64) -> Result<Author> {
        Repository::new(self).find_by_id(id).await
    }

    pub async fn find_author_by_user_id(&self, user_id: i64) -> Result<Author> {
        Repository::new(self)
            .find_one("a.user_id", Value::BigInt(user_id))
            .await
    }

    pub async fn find_all_authors(&self) -> Result<Vec<Author>> {
        Repository::new(self).find_all().await
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub async fn find_post_by_id(&self, id: i64) -> Result<Post> {
        Repository::new(self).find_by_id(id).await
    }

    pub async fn find_all_posts(&self) -> Result<Vec<Post>> {
        Repository::new(self).find_all().await
    }

    // ========================================================================
    // Labels
    // ========================================================================

    pub async fn find_label_by_id(&self, id: i64) -> Result<Label> {
        Repository::new(self).find_by_id(id).await
    }

    pub async fn find_label_by_name(&self, name: &str) -> Result<Label> {
        Repository::new(self)
            .find_one("l.name", Value::Text(name.to_owned()))
            .await
    }

    pub async fn find_all_labels(&self) -> Result<Vec<Label>> {
        Repository::new(self).find_all().await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    pub async fn find_comment_by_id(&self, id: i64) -> Result<Comment> {
        Repository::new(self).find_by_id(id).await
    }

    pub async fn find_all_comments(&self) -> Result<Vec<Comment>> {
        Repository::new(self).find_all().await
    }

    /// Bound `operation` by `deadline`.
    ///
    /// Dropping the inner future on expiry cancels it; an open transaction is
    /// rolled back when its connection returns to the pool.
    pub async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(deadline, operation)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}
