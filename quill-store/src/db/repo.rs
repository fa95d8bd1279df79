//! Generic repository
//!
//! Every entity shares one create/find/update/delete implementation. An entity
//! opts in by describing its table, columns and row mapping through [`Record`].

use std::marker::PhantomData;

use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use tracing::debug;

use super::{bind_values, sql, with_pool, Value};
use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::TRANSIENT_ID;

/// Table description and row mapping for one entity type
pub(crate) trait Record: Sized + Send + Sync + 'static {
    /// Name used in errors and logs
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Writable columns, in the order [`Record::values`] yields them
    const COLUMNS: &'static [&'static str];
    /// Qualified id column of [`Record::select`], used for filters and ordering
    const ID_COLUMN: &'static str;

    type Row: for<'r> FromRow<'r, PgRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static;

    /// `SELECT ... FROM ...` including the joins needed to populate the entity
    fn select() -> String;

    fn from_row(row: Self::Row, store: &Store) -> Self;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Values for [`Record::COLUMNS`]. Fails when a referenced parent is transient.
    fn values(&self) -> Result<Vec<Value>>;
}

/// CRUD operations for `E` against a store's pool
pub(crate) struct Repository<'a, E> {
    store: &'a Store,
    _record: PhantomData<fn() -> E>,
}

impl<'a, E: Record> Repository<'a, E> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<E> {
        self.find_one(E::ID_COLUMN, Value::BigInt(id)).await
    }

    /// First record (by id) whose `column` equals `value`
    pub async fn find_one(&self, column: &str, value: Value) -> Result<E> {
        self.find_first(&[column], vec![value]).await
    }

    /// First record (by id) where every `columns[i]` equals `values[i]`
    pub async fn find_first(&self, columns: &[&str], values: Vec<Value>) -> Result<E> {
        let key = values.iter().map(describe).collect::<Vec<_>>().join("/");
        let sql = format!(
            "{} LIMIT 1",
            sql::select_where(&E::select(), None, columns, E::ID_COLUMN)
        );

        let row: Option<E::Row> = with_pool!(self.store.pool(), conn => {
            bind_values!(sqlx::query_as::<_, E::Row>(&sql), values)
                .fetch_optional(conn)
                .await?
        });

        match row {
            Some(row) => Ok(E::from_row(row, self.store)),
            None => {
                debug!(entity = E::ENTITY, %key, "no matching row");
                Err(StoreError::not_found(E::ENTITY, key))
            }
        }
    }

    pub async fn find_all(&self) -> Result<Vec<E>> {
        self.fetch_many(None, None).await
    }

    /// All records whose `column` equals `value`
    pub async fn find_by(&self, column: &str, value: Value) -> Result<Vec<E>> {
        self.fetch_many(None, Some((column, value))).await
    }

    /// All records reachable through `join` whose `column` equals `id`
    pub async fn find_related(&self, join: &str, column: &str, id: i64) -> Result<Vec<E>> {
        self.fetch_many(Some(join), Some((column, Value::BigInt(id))))
            .await
    }

    async fn fetch_many(&self, join: Option<&str>, filter: Option<(&str, Value)>) -> Result<Vec<E>> {
        let (columns, values): (Vec<&str>, Vec<Value>) = filter.into_iter().unzip();
        let sql = sql::select_where(&E::select(), join, &columns, E::ID_COLUMN);

        let rows: Vec<E::Row> = with_pool!(self.store.pool(), conn => {
            bind_values!(sqlx::query_as::<_, E::Row>(&sql), values)
                .fetch_all(conn)
                .await?
        });

        Ok(rows
            .into_iter()
            .map(|row| E::from_row(row, self.store))
            .collect())
    }

    /// Insert a transient record (assigning its id) or update a persisted one.
    pub async fn save(&self, record: &mut E) -> Result<()> {
        let mut values = record.values()?;

        if record.id() == TRANSIENT_ID {
            let sql = sql::insert_returning_id(E::TABLE, E::COLUMNS);
            let id: i64 = with_pool!(self.store.pool(), conn => {
                bind_values!(sqlx::query_scalar::<_, i64>(&sql), values)
                    .fetch_one(conn)
                    .await?
            });
            record.set_id(id);
            debug!(entity = E::ENTITY, id, "inserted");
        } else {
            let id = record.id();
            values.push(Value::BigInt(id));
            let sql = sql::update_by_id(E::TABLE, E::COLUMNS);
            let affected = with_pool!(self.store.pool(), conn => {
                bind_values!(sqlx::query(&sql), values)
                    .execute(conn)
                    .await?
                    .rows_affected()
            });
            if affected == 0 {
                return Err(StoreError::not_found(E::ENTITY, id));
            }
            debug!(entity = E::ENTITY, id, "updated");
        }

        Ok(())
    }

    /// Delete by id. Deleting a missing row is [`StoreError::NotFound`].
    pub async fn delete(&self, id: i64) -> Result<()> {
        let sql = sql::delete_by_id(E::TABLE);
        let affected = with_pool!(self.store.pool(), conn => {
            sqlx::query(&sql).bind(id).execute(conn).await?.rows_affected()
        });

        if affected == 0 {
            return Err(StoreError::not_found(E::ENTITY, id));
        }
        debug!(entity = E::ENTITY, id, "deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let sql = sql::count(E::TABLE);
        let count = with_pool!(self.store.pool(), conn => {
            sqlx::query_scalar::<_, i64>(&sql).fetch_one(conn).await?
        });
        Ok(count)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::BigInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::NullableText(v) => v.clone().unwrap_or_else(|| "null".into()),
        Value::Timestamp(v) => v.to_rfc3339(),
    }
}
