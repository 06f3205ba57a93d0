use crate::errors::AppError;
use async_trait::async_trait;
use regex::Regex;
use sqlx::PgPool;
use tokio::sync::Mutex;

/// Persistence for the timestamp of the newest delivered answer.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Reads the stored checkpoint. Missing or malformed values are errors.
    async fn read(&self) -> Result<i64, AppError>;

    /// Upserts the checkpoint.
    async fn write(&self, timestamp: i64) -> Result<(), AppError>;
}

/// Checkpoint kept in a single Postgres row.
///
/// The value is stored as text holding the integer timestamp, keyed by a
/// fixed id so several notifiers can share one table.
#[derive(Clone)]
pub struct PgCheckpointStore {
    pool: PgPool,
    table: String,
    id: i32,
}

impl PgCheckpointStore {
    /// Creates a store over `table`, rejecting names that are not plain
    /// (optionally schema-qualified) SQL identifiers since the name is
    /// interpolated into the statements.
    pub fn new(pool: PgPool, table: &str, id: i32) -> Result<Self, AppError> {
        let ident = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .map_err(|e| AppError::Config(format!("Invalid identifier pattern: {}", e)))?;

        if !ident.is_match(table) {
            return Err(AppError::Config(format!(
                "Checkpoint table '{}' is not a valid identifier",
                table
            )));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
            id,
        })
    }

    /// Creates the checkpoint table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                last_comment_time TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            self.table
        );

        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to create checkpoint table {}: {:?}", self.table, e);
            AppError::CheckpointWrite(format!("Failed to create table {}: {}", self.table, e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for PgCheckpointStore {
    async fn read(&self) -> Result<i64, AppError> {
        tracing::info!("Fetching last comment time from {}", self.table);

        let sql = format!(
            "SELECT last_comment_time FROM {} WHERE id = $1",
            self.table
        );

        let raw: Option<String> = sqlx::query_scalar(&sql)
            .bind(self.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Checkpoint read failed: {:?}", e);
                AppError::CheckpointRead(format!("Query on {} failed: {}", self.table, e))
            })?;

        let raw = raw.ok_or_else(|| {
            tracing::error!("No checkpoint row with id {} in {}", self.id, self.table);
            AppError::CheckpointRead(format!(
                "No checkpoint row with id {} in {}",
                self.id, self.table
            ))
        })?;

        let value = parse_checkpoint(&raw)?;
        tracing::info!("Last comment time value is {}", value);
        Ok(value)
    }

    async fn write(&self, timestamp: i64) -> Result<(), AppError> {
        tracing::info!(
            "Updating {} with last comment time of {}",
            self.table,
            timestamp
        );

        let sql = format!(
            "INSERT INTO {} (id, last_comment_time, updated_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (id) DO UPDATE
             SET last_comment_time = EXCLUDED.last_comment_time,
                 updated_at = EXCLUDED.updated_at",
            self.table
        );

        sqlx::query(&sql)
            .bind(self.id)
            .bind(timestamp.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Update failed: {:?}", e);
                AppError::CheckpointWrite(format!("Upsert on {} failed: {}", self.table, e))
            })?;

        Ok(())
    }
}

/// In-process checkpoint, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    value: Mutex<Option<i64>>,
}

impl MemoryCheckpointStore {
    pub fn new(initial: Option<i64>) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }

    /// Current value without the missing-key error of `read`.
    pub async fn peek(&self) -> Option<i64> {
        *self.value.lock().await
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn read(&self) -> Result<i64, AppError> {
        self.value
            .lock()
            .await
            .ok_or_else(|| AppError::CheckpointRead("No checkpoint stored".to_string()))
    }

    async fn write(&self, timestamp: i64) -> Result<(), AppError> {
        *self.value.lock().await = Some(timestamp);
        Ok(())
    }
}

fn parse_checkpoint(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse::<i64>().map_err(|_| {
        tracing::error!("Stored checkpoint '{}' is not an integer", raw);
        AppError::CheckpointRead(format!("Stored checkpoint '{}' is not an integer", raw))
    })
}
