use lazy_static::lazy_static;
use rusqlite_migration::{Migrations, M};

lazy_static! {
    pub static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![M::up(
        r#"
            CREATE TABLE notes (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),

                title TEXT NOT NULL CHECK(length(title) > 0),
                content TEXT NOT NULL CHECK(length(content) > 0),

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#
    ),]);
}


#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::db::{init_test_db, Error, Result};

    async fn insert(title: &'static str, content: &'static str) -> Result<()> {
        let db = init_test_db().await?;
        db.call(move |conn| {
            conn.execute("INSERT INTO notes (title, content) VALUES (?, ?)", [title, content])?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn defaults_fill_id_and_timestamps() -> Result<()> {
        let db = init_test_db().await?;

        let (id, created, updated) = db
            .call(|conn| {
                let row = conn.query_row(
                    "INSERT INTO notes (title, content) VALUES ('A', 'B')
                    RETURNING id, created_at, updated_at",
                    [],
                    |r| Ok((r.get::<_, Uuid>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?)),
                )?;
                Ok(row)
            })
            .await?;

        assert_eq!(id.get_version_num(), 7);
        assert!(!created.is_empty());
        assert_eq!(created, updated);
        Ok(())
    }

    #[tokio::test]
    async fn empty_title_or_content_is_rejected() {
        for (title, content) in [("", "B"), ("A", "")] {
            let error = insert(title, content).await.unwrap_err();
            assert!(matches!(error, Error::Rusqlite(_)), "{error:?}");
        }
    }
}
