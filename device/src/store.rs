//! SQLite-backed record store for the device.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use todosync_engine::store::{require_owner, RecordStore};
use todosync_engine::{Error, Record, RecordId, RecordKey, Result};

/// A stored todo row from the database.
#[derive(Debug)]
struct TodoRow {
    id: i64,
    device: String,
    title: String,
    content: String,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for TodoRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(TodoRow {
            id: row.try_get("id")?,
            device: row.try_get("device")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
        })
    }
}

impl From<TodoRow> for Record {
    fn from(row: TodoRow) -> Self {
        Record {
            id: row.id,
            owner: row.device,
            title: row.title,
            content: row.content,
        }
    }
}

/// Record store over the `testTodos` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url`.
    ///
    /// `sqlite::memory:` databases live on a single pinned connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(storage_error)?
            .create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the todo table if it does not exist yet.
    pub async fn bootstrap(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::StorageUnavailable(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl RecordStore for SqliteStore {
    async fn list_all(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, device, title, content
            FROM testTodos
            ORDER BY id DESC, device ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, device, title, content
            FROM testTodos
            WHERE device = ?
            ORDER BY id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn get(&self, id: RecordId, owner: &str) -> Result<Option<Record>> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, device, title, content
            FROM testTodos
            WHERE id = ? AND device = ?
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Record::from))
    }

    async fn insert(&self, record: &Record) -> Result<()> {
        record.validate()?;

        sqlx::query("INSERT INTO testTodos (id, device, title, content) VALUES (?, ?, ?, ?)")
            .bind(record.id)
            .bind(&record.owner)
            .bind(&record.title)
            .bind(&record.content)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, record.key()))?;

        Ok(())
    }

    async fn update(&self, id: RecordId, owner: &str, title: &str, content: &str) -> Result<()> {
        require_owner(owner)?;

        let result =
            sqlx::query("UPDATE testTodos SET title = ?, content = ? WHERE id = ? AND device = ?")
                .bind(title)
                .bind(content)
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await
                .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(RecordKey::new(id, owner)));
        }
        Ok(())
    }

    async fn delete(&self, id: RecordId, owner: &str) -> Result<()> {
        require_owner(owner)?;

        sqlx::query("DELETE FROM testTodos WHERE id = ? AND device = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}

fn storage_error(e: sqlx::Error) -> Error {
    tracing::error!("Database error: {:?}", e);
    Error::StorageUnavailable(e.to_string())
}

/// Map a failed insert, surfacing primary key collisions.
fn insert_error(e: sqlx::Error, key: RecordKey) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return Error::ConstraintViolation(key);
        }
    }
    storage_error(e)
}
