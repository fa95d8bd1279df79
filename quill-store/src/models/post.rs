use chrono::{DateTime, Utc};
use serde::Serialize;

use super::author::AuthorRow;
use super::{Author, Comment};
use crate::db::{Record, Repository, Value};
use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::TRANSIENT_ID;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PostRow {
    post_id: i64,
    title: String,
    content: String,
    image_url: String,
    date: DateTime<Utc>,
    #[sqlx(flatten)]
    author: AuthorRow,
}

/// A published article
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    #[serde(skip)]
    store: Store,
    id: i64,
    author: Author,
    title: String,
    content: String,
    image_url: String,
    date: DateTime<Utc>,
}

impl Post {
    pub(crate) fn transient(
        store: Store,
        author: Author,
        title: String,
        content: String,
        image_url: String,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            id: TRANSIENT_ID,
            author,
            title,
            content,
            image_url,
            date,
        }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn set_image_url(&mut self, image_url: impl Into<String>) {
        self.image_url = image_url.into();
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }

    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    pub async fn save(&mut self) -> Result<()> {
        let store = self.store.clone();
        Repository::new(&store).save(self).await
    }

    /// Delete the post together with its comments and label attachments
    pub async fn destroy(&self) -> Result<()> {
        Repository::<Post>::new(&self.store).delete(self.id).await
    }

    pub async fn comments(&self) -> Result<Vec<Comment>> {
        Repository::new(&self.store)
            .find_by("c.post_id", Value::BigInt(self.id))
            .await
    }
}

impl Record for Post {
    const ENTITY: &'static str = "post";
    const TABLE: &'static str = "post";
    const COLUMNS: &'static [&'static str] = &["author_id", "title", "content", "image_url", "date"];
    const ID_COLUMN: &'static str = "p.id";

    type Row = PostRow;

    fn select() -> String {
        format!(
            "SELECT p.id AS post_id, p.title AS title, p.content AS content, \
             p.image_url AS image_url, p.date AS date, {} \
             FROM post p \
             JOIN author a ON a.id = p.author_id \
             JOIN blog_user u ON u.id = a.user_id",
            Author::select_columns()
        )
    }

    fn from_row(row: PostRow, store: &Store) -> Self {
        Self {
            store: store.clone(),
            id: row.post_id,
            author: Author::from_author_row(row.author, store),
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            date: row.date,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Result<Vec<Value>> {
        if !self.author.is_persisted() {
            return Err(StoreError::NotPersisted { entity: "author" });
        }
        Ok(vec![
            Value::BigInt(self.author.id()),
            Value::Text(self.title.clone()),
            Value::Text(self.content.clone()),
            Value::Text(self.image_url.clone()),
            Value::Timestamp(self.date),
        ])
    }
}
