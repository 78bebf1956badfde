use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::{
    db::{self, DB},
    errors::NOTE_NOT_FOUND,
    Error, Result,
};

use super::{Note, NoteId, NoteInput};

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

/// Owns every read and write of notes. Cloning shares the same connection.
#[derive(Clone)]
pub struct NoteStore {
    db: DB,
}

impl NoteStore {
    pub fn new(db: DB) -> Self {
        Self { db }
    }

    pub async fn open(database_url: &str) -> Result<Self> {
        Ok(Self::new(db::init_db(database_url).await?))
    }

    /// Shuts the connection down. Clones still held elsewhere fail from now on.
    pub async fn close(self) -> Result<()> {
        db::close_db(self.db).await?;
        tracing::info!("note store closed");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        self.db
            .call(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    pub async fn create(&self, input: NoteInput) -> Result<Note> {
        input.validate()?;
        let NoteInput { title, content } = input;

        self.db
            .call(move |conn| {
                let now = Utc::now();
                conn.query_row(
                    r#"INSERT INTO notes (title, content, created_at, updated_at)
                    VALUES (?, ?, ?, ?)
                    RETURNING id, title, content, created_at, updated_at"#,
                    params![title, content, now, now],
                    |row| Note::try_from(row),
                )
                .map_err(|e| e.into())
            })
            .await
            .map_err(Error::from)
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        self.db
            .call(|conn| {
                let notes = conn
                    .prepare(
                        "SELECT id, title, content, created_at, updated_at FROM notes ORDER BY id",
                    )?
                    .query_map([], |row| Note::try_from(row))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn get(&self, id: NoteId) -> Result<Note> {
        self.db
            .call(move |conn| {
                let note = conn.query_row(
                    "SELECT id, title, content, created_at, updated_at FROM notes WHERE id = ?",
                    params![id],
                    |row| Note::try_from(row),
                )?;
                Ok(note)
            })
            .await
            .map_err(Error::from)
            .map_err(|e| e.not_found_message(NOTE_NOT_FOUND))
    }

    /// Replaces title and content and refreshes `updated_at`.
    ///
    /// An unknown id is reported as not found before the input is validated.
    pub async fn update(&self, id: NoteId, input: NoteInput) -> Result<Note> {
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;

                let created_at = tx.query_row(
                    "SELECT created_at FROM notes WHERE id = ?",
                    params![id],
                    |row| row.get::<_, DateTime<Utc>>(0),
                )?;

                input.validate()?;
                let NoteInput { title, content } = input;

                // updated_at never precedes created_at, even if the clock went backwards
                let updated_at = Utc::now().max(created_at);

                let note = tx.query_row(
                    r#"UPDATE notes SET title = ?, content = ?, updated_at = ?
                    WHERE id = ?
                    RETURNING id, title, content, created_at, updated_at"#,
                    params![title, content, updated_at, id],
                    |row| Note::try_from(row),
                )?;

                tx.commit()?;
                Ok(note)
            })
            .await
            .map_err(Error::from)
            .map_err(|e| e.not_found_message(NOTE_NOT_FOUND))
    }

    pub async fn delete(&self, id: NoteId) -> Result<Note> {
        self.db
            .call(move |conn| {
                conn.query_row(
                    r#"DELETE FROM notes
                    WHERE id = ?
                    RETURNING id, title, content, created_at, updated_at"#,
                    params![id],
                    |row| Note::try_from(row),
                )
                .map_err(|e| e.into())
            })
            .await
            .map_err(Error::from)
            .map_err(|e| e.not_found_message(NOTE_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, time::Duration};

    use uuid::Uuid;

    use super::*;
    use crate::db::init_test_db;

    async fn test_store() -> Result<NoteStore> {
        Ok(NoteStore::new(init_test_db().await?))
    }

    #[tokio::test]
    async fn create_then_get() -> Result<()> {
        let store = test_store().await?;

        let created = store.create(NoteInput::new("A", "B")).await?;
        let fetched = store.get(created.id).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "A");
        assert_eq!(fetched.content, "B");
        assert_eq!(fetched.created_at, fetched.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_unique() -> Result<()> {
        let store = test_store().await?;

        let first = store.create(NoteInput::new("A", "B")).await?;
        let second = store.create(NoteInput::new("A", "B")).await?;

        assert_ne!(first.id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_empty_fields_and_persists_nothing() -> Result<()> {
        let store = test_store().await?;

        for input in [NoteInput::new("", "B"), NoteInput::new("A", ""), NoteInput::default()] {
            let error = store.create(input).await.unwrap_err();
            assert!(matches!(error, Error::Validation(_)), "{error:?}");
        }

        assert!(store.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_fields_and_bumps_updated_at() -> Result<()> {
        let store = test_store().await?;
        let created = store.create(NoteInput::new("A", "B")).await?;

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = store.update(created.id, NoteInput::new("A2", "B2")).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.content, "B2");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > updated.created_at);

        assert_eq!(store.get(created.id).await?, updated);
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_empty_fields_and_keeps_note() -> Result<()> {
        let store = test_store().await?;
        let created = store.create(NoteInput::new("A", "B")).await?;

        let error = store.update(created.id, NoteInput::new("A2", "")).await.unwrap_err();

        assert!(matches!(error, Error::Validation(_)), "{error:?}");
        assert_eq!(store.get(created.id).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_always_not_found() -> Result<()> {
        let store = test_store().await?;
        let id = Uuid::now_v7();

        let errors = [
            store.get(id).await.unwrap_err(),
            store.update(id, NoteInput::new("A", "B")).await.unwrap_err(),
            store.update(id, NoteInput::default()).await.unwrap_err(),
            store.delete(id).await.unwrap_err(),
        ];

        for error in errors {
            assert!(
                matches!(&error, Error::NotFound(message) if message == "Note not found"),
                "{error:?}"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn deleted_note_is_gone() -> Result<()> {
        let store = test_store().await?;
        let created = store.create(NoteInput::new("A", "B")).await?;

        let deleted = store.delete(created.id).await?;
        assert_eq!(deleted.id, created.id);

        assert!(matches!(store.get(created.id).await, Err(Error::NotFound(_))));
        assert!(matches!(store.delete(created.id).await, Err(Error::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_live_notes() -> Result<()> {
        let store = test_store().await?;
        assert!(store.list().await?.is_empty());

        let a = store.create(NoteInput::new("a", "1")).await?;
        let b = store.create(NoteInput::new("b", "2")).await?;
        let c = store.create(NoteInput::new("c", "3")).await?;
        store.delete(b.id).await?;

        let ids = store.list().await?.into_iter().map(|n| n.id).collect::<HashSet<_>>();
        assert_eq!(ids, HashSet::from([a.id, c.id]));

        let first = store.list().await?;
        let second = store.list().await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn closed_store_fails_with_store_error() -> Result<()> {
        let store = test_store().await?;
        let handle = store.clone();
        handle.ping().await?;

        store.close().await?;

        let id = Uuid::now_v7();
        assert!(matches!(handle.list().await, Err(Error::DB(_))));
        assert!(matches!(handle.get(id).await, Err(Error::DB(_))));
        assert!(matches!(handle.update(id, NoteInput::new("A", "B")).await, Err(Error::DB(_))));
        assert!(matches!(handle.delete(id).await, Err(Error::DB(_))));
        assert!(handle.ping().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn update_never_moves_updated_at_before_created_at() -> Result<()> {
        let store = test_store().await?;
        let id = Uuid::now_v7();
        let created_at = Utc::now() + chrono::Duration::hours(1);

        store
            .db
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO notes (id, title, content, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?)"#,
                    params![id, "A", "B", created_at, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        let updated = store.update(id, NoteInput::new("A2", "B2")).await?;

        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, updated.created_at);
        Ok(())
    }
}
