//! Shared fixtures for store integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use quill_store::{Author, OAuthIdentity, Post, Postgres, Sqlite, Store, User};
use tempfile::TempDir;

static SEQ: AtomicU32 = AtomicU32::new(0);

/// Store on a fresh SQLite file; the directory lives as long as the fixture
pub struct TestStore {
    pub store: Store,
    _dir: TempDir,
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

pub async fn sqlite_store() -> TestStore {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(Sqlite::new(dir.path().join("blog.db")))
        .await
        .expect("open sqlite store");
    TestStore { store, _dir: dir }
}

/// Store on `$DATABASE_URL` with an empty schema
pub async fn postgres_store() -> Store {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let store = Store::open(Postgres::new(url.clone()))
        .await
        .expect("open postgres store");
    store.teardown().await.expect("teardown");
    store.close().await;
    Store::open(Postgres::new(url))
        .await
        .expect("reopen postgres store")
}

pub fn date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 30, 0).unwrap()
}

fn next() -> u32 {
    SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Transient user with a unique username and email
pub fn generate_user(store: &Store) -> User {
    let n = next();
    store.new_user(
        format!("user{n}"),
        format!("user{n}@example.com"),
        date(1),
        -5,
        OAuthIdentity {
            provider: "github".into(),
            oauth_id: 1000 + i64::from(n),
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
        },
    )
}

pub async fn saved_user(store: &Store) -> User {
    let mut user = generate_user(store);
    user.save().await.expect("save user");
    user
}

/// Saved author wrapping a freshly saved user
pub async fn generate_author(store: &Store) -> Author {
    let user = saved_user(store).await;
    let mut author = store.new_author(&user, Some("@quill".into()));
    author.save().await.expect("save author");
    author
}

pub async fn saved_post(store: &Store, author: &Author, title: &str) -> Post {
    let mut post = store.new_post(author, title, "body", "https://img.example/1.png", date(2));
    post.save().await.expect("save post");
    post
}
