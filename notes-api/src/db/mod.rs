mod migrations;

use rusqlite::functions::FunctionFlags;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use migrations::MIGRATIONS;

pub use rusqlite;
pub use tokio_rusqlite;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error(transparent)]
    TokioRusqlite(tokio_rusqlite::Error),
    #[error(transparent)]
    Rusqlite(rusqlite::Error),
    #[error(transparent)]
    Migration(#[from] rusqlite_migration::Error),
}

impl Error {
    pub fn not_found_message(self, message: impl Into<String>) -> Self {
        if matches!(self, Self::NotFound(_)) {
            return Self::NotFound(message.into());
        }
        self
    }
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Rusqlite(error) => Self::from(error),
            error => Self::TokioRusqlite(error),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound("Not found".into()),
            error => Self::Rusqlite(error),
        }
    }
}

pub type DB = Connection;

/// Opens the database behind `database_url` and brings its schema up to date.
///
/// Accepts a plain SQLite path, a `sqlite://` prefixed one, or `:memory:`.
pub async fn init_db(database_url: &str) -> Result<DB> {
    let path = database_url.strip_prefix("sqlite://").unwrap_or(database_url);
    let conn = Connection::open(path).await?;

    migrate(&conn).await?;

    tracing::info!(path, "database ready");

    Ok(conn)
}

async fn migrate(conn: &DB) -> Result<()> {
    conn.call(|conn| {
        add_uuid_functions(conn)?;

        if let Err(error) = MIGRATIONS.to_latest(conn) {
            return Ok(Err(error));
        }

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Ok(()))
    })
    .await??;

    Ok(())
}

pub async fn close_db(db: DB) -> Result<()> {
    db.close().await?;
    Ok(())
}

fn add_uuid_functions(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function("uuid7_now", 0, FunctionFlags::SQLITE_UTF8, |_| {
        Ok(Uuid::now_v7())
    })?;

    conn.create_scalar_function("uuid_blob", 1, FunctionFlags::SQLITE_UTF8, |ctx| {
        let value = ctx.get::<String>(0)?;
        let uuid = Uuid::parse_str(&value)
            .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;

        Ok(uuid)
    })?;

    Ok(())
}

#[cfg(test)]
pub async fn init_test_db() -> Result<DB> {
    init_db(":memory:").await
}
