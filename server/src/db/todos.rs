//! Database operations for the todos table.

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
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

impl<'r> sqlx::FromRow<'r, PgRow> for TodoRow {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
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

/// Record store over the shared `todos` table.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(storage_error)?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::StorageUnavailable(e.to_string()))
    }
}

impl RecordStore for PgStore {
    async fn list_all(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, device, title, content
            FROM todos
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
            FROM todos
            WHERE device = $1
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
            "SELECT id, device, title, content FROM todos WHERE id = $1 AND device = $2",
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

        sqlx::query(
            r#"
            INSERT INTO todos (id, device, title, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
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

        let result = sqlx::query(
            r#"
            UPDATE todos SET title = $1, content = $2
            WHERE id = $3 AND device = $4
            "#,
        )
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

        sqlx::query("DELETE FROM todos WHERE id = $1 AND device = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
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

fn insert_error(e: sqlx::Error, key: RecordKey) -> Error {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::ConstraintViolation(key)
        }
        _ => storage_error(e),
    }
}
