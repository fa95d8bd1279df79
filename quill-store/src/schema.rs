//! Schema lifecycle
//!
//! Tables are created in dependency order (every table only references tables
//! created before it) and dropped in reverse. Both directions run inside a
//! single transaction so a failure leaves no half-built schema behind.

use tracing::{debug, info};

use crate::db::{rollback, with_pool, DbPool};
use crate::dialect::Dialect;
use crate::error::{Result, StoreError};

/// One table of the logical schema
pub(crate) struct Table {
    pub name: &'static str,
    create: fn(&dyn Dialect) -> String,
}

impl Table {
    pub fn create_sql(&self, dialect: &dyn Dialect) -> String {
        (self.create)(dialect)
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

/// All tables, topologically sorted by foreign keys
pub(crate) static TABLES: [Table; 6] = [
    Table {
        name: "blog_user",
        create: create_user,
    },
    Table {
        name: "author",
        create: create_author,
    },
    Table {
        name: "post",
        create: create_post,
    },
    Table {
        name: "label",
        create: create_label,
    },
    Table {
        name: "post_label",
        create: create_post_label,
    },
    Table {
        name: "comment",
        create: create_comment,
    },
];

fn create_user(d: &dyn Dialect) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS blog_user (
            id {pk},
            username VARCHAR(255) NOT NULL UNIQUE,
            registration_date {ts} NOT NULL,
            timezone INTEGER NOT NULL,
            oauth_provider VARCHAR(128) NOT NULL,
            oauth_id BIGINT NOT NULL,
            access_token VARCHAR(255) NOT NULL,
            refresh_token VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE
        )
        "#,
        pk = d.primary_key_clause(),
        ts = d.timestamp_clause(),
    )
}

fn create_author(d: &dyn Dialect) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS author (
            id {pk},
            user_id {fk} NOT NULL UNIQUE REFERENCES blog_user(id) ON DELETE CASCADE,
            twitter VARCHAR(255)
        )
        "#,
        pk = d.primary_key_clause(),
        fk = d.foreign_key_type(),
    )
}

fn create_post(d: &dyn Dialect) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS post (
            id {pk},
            author_id {fk} NOT NULL REFERENCES author(id) ON DELETE CASCADE,
            title VARCHAR(255) NOT NULL,
            content TEXT NOT NULL,
            image_url VARCHAR(255) NOT NULL,
            date {ts} NOT NULL
        )
        "#,
        pk = d.primary_key_clause(),
        fk = d.foreign_key_type(),
        ts = d.timestamp_clause(),
    )
}

fn create_label(d: &dyn Dialect) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS label (
            id {pk},
            name VARCHAR(255) NOT NULL UNIQUE
        )
        "#,
        pk = d.primary_key_clause(),
    )
}

fn create_post_label(d: &dyn Dialect) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS post_label (
            post_id {fk} NOT NULL REFERENCES post(id) ON DELETE CASCADE,
            label_id {fk} NOT NULL REFERENCES label(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, label_id)
        )
        "#,
        fk = d.foreign_key_type(),
    )
}

fn create_comment(d: &dyn Dialect) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS comment (
            id {pk},
            user_id {fk} NOT NULL REFERENCES blog_user(id) ON DELETE CASCADE,
            post_id {fk} NOT NULL REFERENCES post(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            date {ts} NOT NULL,
            up_vote BIGINT NOT NULL DEFAULT 0,
            down_vote BIGINT NOT NULL DEFAULT 0
        )
        "#,
        pk = d.primary_key_clause(),
        fk = d.foreign_key_type(),
        ts = d.timestamp_clause(),
    )
}

/// Create every table, all or nothing
pub(crate) async fn create_all(dialect: &dyn Dialect, pool: &DbPool) -> Result<()> {
    info!(driver = %dialect.driver(), "creating schema");
    let statements: Vec<(&'static str, String)> = TABLES
        .iter()
        .map(|table| (table.name, table.create_sql(dialect)))
        .collect();
    run_all(pool, statements).await
}

/// Drop every table, dependents first
pub(crate) async fn drop_all(pool: &DbPool) -> Result<()> {
    info!(driver = %pool.driver(), "dropping schema");
    let statements: Vec<(&'static str, String)> = TABLES
        .iter()
        .rev()
        .map(|table| (table.name, table.drop_sql()))
        .collect();
    run_all(pool, statements).await
}

async fn run_all(pool: &DbPool, statements: Vec<(&'static str, String)>) -> Result<()> {
    with_pool!(pool, conn => {
        let mut tx = conn.begin().await.map_err(StoreError::Transaction)?;

        let outcome = async {
            for (table, statement) in &statements {
                let table = *table;
                sqlx::query(statement)
                    .execute(&mut *tx)
                    .await
                    .map_err(|source| StoreError::Schema { table, source })?;
                debug!(table, "ok");
            }
            Ok::<(), StoreError>(())
        }
        .await;

        match outcome {
            Ok(()) => tx.commit().await.map_err(StoreError::Transaction),
            Err(err) => Err(rollback(tx, err).await),
        }
    })
}
