use serde::Serialize;

use super::user::{UserRow, USER_COLUMNS};
use super::{Post, User};
use crate::db::{Record, Repository, Value};
use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::TRANSIENT_ID;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AuthorRow {
    author_id: i64,
    twitter: Option<String>,
    #[sqlx(flatten)]
    user: UserRow,
}

/// A user allowed to publish posts
#[derive(Debug, Clone, Serialize)]
pub struct Author {
    #[serde(skip)]
    store: Store,
    id: i64,
    user: User,
    twitter: Option<String>,
}

impl Author {
    pub(crate) fn transient(store: Store, user: User, twitter: Option<String>) -> Self {
        Self {
            store,
            id: TRANSIENT_ID,
            user,
            twitter,
        }
    }

    pub(crate) fn from_author_row(row: AuthorRow, store: &Store) -> Self {
        Self {
            store: store.clone(),
            id: row.author_id,
            user: User::from_user_row(row.user, store),
            twitter: row.twitter,
        }
    }

    /// Columns and joins for a select that materialises an [`Author`]
    pub(crate) fn select_columns() -> String {
        format!("a.id AS author_id, a.twitter AS twitter, {USER_COLUMNS}")
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn twitter(&self) -> Option<&str> {
        self.twitter.as_deref()
    }

    pub fn set_twitter(&mut self, twitter: Option<String>) {
        self.twitter = twitter;
    }

    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    /// Insert or update. The wrapped user must already be saved.
    pub async fn save(&mut self) -> Result<()> {
        let store = self.store.clone();
        Repository::new(&store).save(self).await
    }

    /// Delete the row. Posts by this author cascade; the user remains.
    pub async fn destroy(&self) -> Result<()> {
        Repository::<Author>::new(&self.store).delete(self.id).await
    }

    /// Posts by this author, oldest first
    pub async fn posts(&self) -> Result<Vec<Post>> {
        Repository::new(&self.store)
            .find_by("p.author_id", Value::BigInt(self.id))
            .await
    }
}

impl Record for Author {
    const ENTITY: &'static str = "author";
    const TABLE: &'static str = "author";
    const COLUMNS: &'static [&'static str] = &["user_id", "twitter"];
    const ID_COLUMN: &'static str = "a.id";

    type Row = AuthorRow;

    fn select() -> String {
        format!(
            "SELECT {} FROM author a JOIN blog_user u ON u.id = a.user_id",
            Self::select_columns()
        )
    }

    fn from_row(row: AuthorRow, store: &Store) -> Self {
        Self::from_author_row(row, store)
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Result<Vec<Value>> {
        if !self.user.is_persisted() {
            return Err(StoreError::NotPersisted { entity: "user" });
        }
        Ok(vec![
            Value::BigInt(self.user.id()),
            Value::NullableText(self.twitter.clone()),
        ])
    }
}
