//! Post/label association
//!
//! Labels are weak entities identified by name. Attaching one is a
//! find-or-create of the label followed by an insert into `post_label`, both in
//! one transaction. Every insert uses `ON CONFLICT DO NOTHING`: a duplicate
//! never raises, so the transaction stays usable on backends that abort it
//! after an error, and concurrent attaches of a new name converge on one row.

use tracing::{debug, instrument};

use crate::db::{rollback, with_pool, DbPool, Repository};
use crate::error::{Result, StoreError};
use crate::models::{Label, LabelRow, Post};

const INSERT_LABEL: &str = "INSERT INTO label (name) VALUES ($1) ON CONFLICT (name) DO NOTHING";
const SELECT_LABEL_BY_NAME: &str =
    "SELECT id AS label_id, name AS label_name FROM label WHERE name = $1";
const INSERT_POST_LABEL: &str = "INSERT INTO post_label (post_id, label_id) VALUES ($1, $2) \
     ON CONFLICT (post_id, label_id) DO NOTHING";
const DELETE_POST_LABEL: &str = "DELETE FROM post_label WHERE post_id = $1 AND label_id = $2";
const DELETE_LABEL_LINKS: &str = "DELETE FROM post_label WHERE label_id = $1";
const DELETE_LABEL: &str = "DELETE FROM label WHERE id = $1";

const LABELS_OF_POST: &str = "JOIN post_label pl ON pl.label_id = l.id";
const POSTS_OF_LABEL: &str = "JOIN post_label pl ON pl.post_id = p.id";

impl Post {
    /// Attach the label called `name`, creating it if no label has that name.
    ///
    /// Attaching a label that is already attached is a no-op returning the
    /// existing label.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotPersisted`] for an unsaved post. Begin, commit and
    /// rollback failures surface as [`StoreError::Transaction`]; any other
    /// failure is rolled back and wrapped in [`StoreError::Association`].
    #[instrument(skip(self), fields(post_id = self.id()))]
    pub async fn add_label(&self, name: &str) -> Result<Label> {
        if !self.is_persisted() {
            return Err(StoreError::NotPersisted { entity: "post" });
        }

        let row = attach(self.store().pool(), self.id(), name)
            .await
            .map_err(|err| match err {
                StoreError::Transaction(_) => err,
                source => StoreError::Association {
                    name: name.to_owned(),
                    source: Box::new(source),
                },
            })?;

        debug!(label_id = row.label_id, "label attached");
        Ok(Label::from_label_row(row, self.store()))
    }

    /// Detach `label` from this post. The label itself is kept.
    #[instrument(skip_all, fields(post_id = self.id(), label_id = label.id()))]
    pub async fn remove_label(&self, label: &Label) -> Result<()> {
        let (post_id, label_id) = (self.id(), label.id());
        let affected = with_pool!(self.store().pool(), conn => {
            sqlx::query(DELETE_POST_LABEL)
                .bind(post_id)
                .bind(label_id)
                .execute(conn)
                .await?
                .rows_affected()
        });

        if affected == 0 {
            return Err(StoreError::not_found(
                "post_label",
                format!("{post_id}/{label_id}"),
            ));
        }
        debug!("label detached");
        Ok(())
    }

    /// Labels attached to this post, ordered by id
    pub async fn labels(&self) -> Result<Vec<Label>> {
        Repository::new(self.store())
            .find_related(LABELS_OF_POST, "pl.post_id", self.id())
            .await
    }
}

impl Label {
    /// Detach the label from every post, then delete it
    #[instrument(skip(self), fields(label_id = self.id()))]
    pub async fn destroy(&self) -> Result<()> {
        let id = self.id();
        with_pool!(self.store().pool(), conn => {
            let mut tx = conn.begin().await.map_err(StoreError::Transaction)?;

            let outcome = async {
                sqlx::query(DELETE_LABEL_LINKS).bind(id).execute(&mut *tx).await?;
                let deleted = sqlx::query(DELETE_LABEL)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                if deleted == 0 {
                    return Err(StoreError::not_found("label", id));
                }
                Ok::<(), StoreError>(())
            }
            .await;

            match outcome {
                Ok(()) => tx.commit().await.map_err(StoreError::Transaction)?,
                Err(err) => return Err(rollback(tx, err).await),
            }
        });

        debug!("label deleted");
        Ok(())
    }

    /// Posts carrying this label, ordered by id
    pub async fn posts(&self) -> Result<Vec<Post>> {
        Repository::new(self.store())
            .find_related(POSTS_OF_LABEL, "pl.label_id", self.id())
            .await
    }
}

async fn attach(pool: &DbPool, post_id: i64, name: &str) -> Result<LabelRow> {
    with_pool!(pool, conn => {
        let mut tx = conn.begin().await.map_err(StoreError::Transaction)?;

        let outcome = async {
            sqlx::query(INSERT_LABEL).bind(name).execute(&mut *tx).await?;
            let label: LabelRow = sqlx::query_as(SELECT_LABEL_BY_NAME)
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;
            sqlx::query(INSERT_POST_LABEL)
                .bind(post_id)
                .bind(label.label_id)
                .execute(&mut *tx)
                .await?;
            Ok::<_, StoreError>(label)
        }
        .await;

        match outcome {
            Ok(label) => {
                tx.commit().await.map_err(StoreError::Transaction)?;
                Ok(label)
            }
            Err(err) => Err(rollback(tx, err).await),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_never_raise_on_duplicates() {
        assert!(INSERT_LABEL.ends_with("ON CONFLICT (name) DO NOTHING"));
        assert!(INSERT_POST_LABEL.ends_with("ON CONFLICT (post_id, label_id) DO NOTHING"));
    }

    #[test]
    fn test_detach_targets_exact_pair() {
        assert!(DELETE_POST_LABEL.contains("post_id = $1 AND label_id = $2"));
    }
}
