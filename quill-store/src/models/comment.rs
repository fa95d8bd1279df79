use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Post, User};
use crate::db::{Record, Repository, Value};
use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::TRANSIENT_ID;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CommentRow {
    comment_id: i64,
    user_id: i64,
    post_id: i64,
    content: String,
    date: DateTime<Utc>,
    up_vote: i64,
    down_vote: i64,
}

/// A user's reply to a post.
///
/// Holds the ids of its user and post; [`Comment::user`] and
/// [`Comment::post`] load them on demand.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    #[serde(skip)]
    store: Store,
    id: i64,
    user_id: i64,
    post_id: i64,
    content: String,
    date: DateTime<Utc>,
    up_vote: i64,
    down_vote: i64,
}

impl Comment {
    pub(crate) fn transient(
        store: Store,
        user_id: i64,
        post_id: i64,
        content: String,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            id: TRANSIENT_ID,
            user_id,
            post_id,
            content,
            date,
            up_vote: 0,
            down_vote: 0,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn post_id(&self) -> i64 {
        self.post_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }

    pub fn up_vote(&self) -> i64 {
        self.up_vote
    }

    pub fn set_up_vote(&mut self, count: i64) {
        self.up_vote = count;
    }

    pub fn down_vote(&self) -> i64 {
        self.down_vote
    }

    pub fn set_down_vote(&mut self, count: i64) {
        self.down_vote = count;
    }

    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    pub async fn save(&mut self) -> Result<()> {
        let store = self.store.clone();
        Repository::new(&store).save(self).await
    }

    pub async fn destroy(&self) -> Result<()> {
        Repository::<Comment>::new(&self.store).delete(self.id).await
    }

    pub async fn user(&self) -> Result<User> {
        self.store.find_user_by_id(self.user_id).await
    }

    pub async fn post(&self) -> Result<Post> {
        self.store.find_post_by_id(self.post_id).await
    }
}

impl Record for Comment {
    const ENTITY: &'static str = "comment";
    const TABLE: &'static str = "comment";
    const COLUMNS: &'static [&'static str] =
        &["user_id", "post_id", "content", "date", "up_vote", "down_vote"];
    const ID_COLUMN: &'static str = "c.id";

    type Row = CommentRow;

    fn select() -> String {
        "SELECT c.id AS comment_id, c.user_id AS user_id, c.post_id AS post_id, \
         c.content AS content, c.date AS date, c.up_vote AS up_vote, c.down_vote AS down_vote \
         FROM comment c"
            .to_owned()
    }

    fn from_row(row: CommentRow, store: &Store) -> Self {
        Self {
            store: store.clone(),
            id: row.comment_id,
            user_id: row.user_id,
            post_id: row.post_id,
            content: row.content,
            date: row.date,
            up_vote: row.up_vote,
            down_vote: row.down_vote,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Result<Vec<Value>> {
        if self.user_id == TRANSIENT_ID {
            return Err(StoreError::NotPersisted { entity: "user" });
        }
        if self.post_id == TRANSIENT_ID {
            return Err(StoreError::NotPersisted { entity: "post" });
        }
        Ok(vec![
            Value::BigInt(self.user_id),
            Value::BigInt(self.post_id),
            Value::Text(self.content.clone()),
            Value::Timestamp(self.date),
            Value::BigInt(self.up_vote),
            Value::BigInt(self.down_vote),
        ])
    }
}
