use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, instrument};

use super::{initialize_database, sqlite_url};
use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::ports::{StateKey, StateStore, StateValues};

/// `SQLite` implementation of [`StateStore`].
///
/// Each key is one row holding a JSON document.
#[derive(Clone)]
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `path`, creating and migrating it when needed.
    pub async fn open(path: &str) -> EcoResult<Self> {
        let pool = initialize_database(&sqlite_url(path))
            .await
            .map_err(|e| EcoError::Storage(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    async fn get(&self, keys: &[StateKey]) -> EcoResult<StateValues> {
        if keys.is_empty() {
            return Ok(StateValues::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT key, value FROM state_entries WHERE key IN (");
        let mut separated = query.separated(", ");
        for key in keys {
            separated.push_bind(key.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<(String, String)> = query.build_query_as().fetch_all(&self.pool).await?;

        let mut values = StateValues::with_capacity(rows.len());
        for (key, raw) in rows {
            let key: StateKey = key.parse()?;
            values.insert(key, serde_json::from_str(&raw)?);
        }
        debug!(found = values.len(), "state read");
        Ok(values)
    }

    #[instrument(skip(self, values), fields(keys = values.len()))]
    async fn set(&self, values: StateValues) -> EcoResult<()> {
        let updated_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for (key, value) in &values {
            let raw = serde_json::to_string(value)?;
            sqlx::query(
                "INSERT INTO state_entries (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(key.as_str())
            .bind(raw)
            .bind(updated_at.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("state written");
        Ok(())
    }
}
