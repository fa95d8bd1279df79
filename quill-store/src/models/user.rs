use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, Comment};
use crate::db::{Record, Repository, Value};
use crate::error::Result;
use crate::store::Store;
use crate::TRANSIENT_ID;

/// Columns shared by every select that materialises a [`User`]
pub(crate) const USER_COLUMNS: &str = "u.id AS user_id, u.username AS username, \
     u.registration_date AS registration_date, u.timezone AS timezone, \
     u.oauth_provider AS oauth_provider, u.oauth_id AS oauth_id, \
     u.access_token AS access_token, u.refresh_token AS refresh_token, u.email AS email";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    user_id: i64,
    username: String,
    registration_date: DateTime<Utc>,
    timezone: i32,
    oauth_provider: String,
    oauth_id: i64,
    access_token: String,
    refresh_token: String,
    email: String,
}

/// Identity issued by the OAuth provider a user signed in with.
///
/// Tokens are never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthIdentity {
    pub provider: String,
    pub oauth_id: i64,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
}

/// A registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip)]
    store: Store,
    id: i64,
    username: String,
    email: String,
    registration_date: DateTime<Utc>,
    timezone: i32,
    #[serde(flatten)]
    oauth: OAuthIdentity,
}

impl User {
    pub(crate) fn transient(
        store: Store,
        username: String,
        email: String,
        registration_date: DateTime<Utc>,
        timezone: i32,
        oauth: OAuthIdentity,
    ) -> Self {
        Self {
            store,
            id: TRANSIENT_ID,
            username,
            email,
            registration_date,
            timezone,
            oauth,
        }
    }

    pub(crate) fn from_user_row(row: UserRow, store: &Store) -> Self {
        Self {
            store: store.clone(),
            id: row.user_id,
            username: row.username,
            email: row.email,
            registration_date: row.registration_date,
            timezone: row.timezone,
            oauth: OAuthIdentity {
                provider: row.oauth_provider,
                oauth_id: row.oauth_id,
                access_token: row.access_token,
                refresh_token: row.refresh_token,
            },
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn registration_date(&self) -> DateTime<Utc> {
        self.registration_date
    }

    pub fn set_registration_date(&mut self, date: DateTime<Utc>) {
        self.registration_date = date;
    }

    /// Offset from UTC in hours
    pub fn timezone(&self) -> i32 {
        self.timezone
    }

    pub fn set_timezone(&mut self, timezone: i32) {
        self.timezone = timezone;
    }

    pub fn oauth(&self) -> &OAuthIdentity {
        &self.oauth
    }

    pub fn oauth_provider(&self) -> &str {
        &self.oauth.provider
    }

    pub fn set_oauth_provider(&mut self, provider: impl Into<String>) {
        self.oauth.provider = provider.into();
    }

    pub fn oauth_id(&self) -> i64 {
        self.oauth.oauth_id
    }

    pub fn set_oauth_id(&mut self, oauth_id: i64) {
        self.oauth.oauth_id = oauth_id;
    }

    pub fn access_token(&self) -> &str {
        &self.oauth.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.oauth.refresh_token
    }

    /// Replace both tokens after a refresh
    pub fn set_tokens(&mut self, access: impl Into<String>, refresh: impl Into<String>) {
        self.oauth.access_token = access.into();
        self.oauth.refresh_token = refresh.into();
    }

    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    pub async fn save(&mut self) -> Result<()> {
        let store = self.store.clone();
        Repository::new(&store).save(self).await
    }

    /// Delete the row. The author profile and comments cascade.
    pub async fn destroy(&self) -> Result<()> {
        Repository::<User>::new(&self.store).delete(self.id).await
    }

    /// Comments written by this user, oldest first
    pub async fn comments(&self) -> Result<Vec<Comment>> {
        Repository::new(&self.store)
            .find_by("c.user_id", Value::BigInt(self.id))
            .await
    }

    /// The author profile wrapping this user, if one exists
    pub async fn author(&self) -> Result<Option<Author>> {
        match self.store.find_author_by_user_id(self.id).await {
            Ok(author) => Ok(Some(author)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Record for User {
    const ENTITY: &'static str = "user";
    const TABLE: &'static str = "blog_user";
    const COLUMNS: &'static [&'static str] = &[
        "username",
        "registration_date",
        "timezone",
        "oauth_provider",
        "oauth_id",
        "access_token",
        "refresh_token",
        "email",
    ];
    const ID_COLUMN: &'static str = "u.id";

    type Row = UserRow;

    fn select() -> String {
        format!("SELECT {USER_COLUMNS} FROM blog_user u")
    }

    fn from_row(row: UserRow, store: &Store) -> Self {
        Self::from_user_row(row, store)
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::Text(self.username.clone()),
            Value::Timestamp(self.registration_date),
            Value::Int(self.timezone),
            Value::Text(self.oauth.provider.clone()),
            Value::BigInt(self.oauth.oauth_id),
            Value::Text(self.oauth.access_token.clone()),
            Value::Text(self.oauth.refresh_token.clone()),
            Value::Text(self.email.clone()),
        ])
    }
}
