use serde::Serialize;

use crate::db::{Record, Repository, Value};
use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::TRANSIENT_ID;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LabelRow {
    pub label_id: i64,
    pub label_name: String,
}

/// A tag attached to posts, unique by name.
///
/// Labels are created by [`Post::add_label`](crate::Post::add_label), never
/// saved directly.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    #[serde(skip)]
    store: Store,
    id: i64,
    name: String,
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Label {
    pub(crate) fn transient(store: Store, name: String) -> Self {
        Self {
            store,
            id: TRANSIENT_ID,
            name,
        }
    }

    pub(crate) fn from_label_row(row: LabelRow, store: &Store) -> Self {
        Self {
            store: store.clone(),
            id: row.label_id,
            name: row.label_name,
        }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    /// Rename a persisted label.
    ///
    /// A name already used by another label is a constraint violation.
    pub async fn save(&mut self) -> Result<()> {
        if !self.is_persisted() {
            return Err(StoreError::NotPersisted { entity: "label" });
        }
        let store = self.store.clone();
        Repository::new(&store).save(self).await
    }
}

impl Record for Label {
    const ENTITY: &'static str = "label";
    const TABLE: &'static str = "label";
    const COLUMNS: &'static [&'static str] = &["name"];
    const ID_COLUMN: &'static str = "l.id";

    type Row = LabelRow;

    fn select() -> String {
        "SELECT l.id AS label_id, l.name AS label_name FROM label l".to_owned()
    }

    fn from_row(row: LabelRow, store: &Store) -> Self {
        Self::from_label_row(row, store)
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Result<Vec<Value>> {
        Ok(vec![Value::Text(self.name.clone())])
    }
}
