use async_trait::async_trait;
use clip_core::error::Result;
use clip_core::{Lookup, OwnedUrl, SaveOutcome, Store, StorageError, UrlRecord};
use jiff::Timestamp;
use sqlx::{PgPool, Row};
use tracing::warn;

/// PostgreSQL implementation of the [`Store`] contract.
///
/// Collective uniqueness of `original_url` rides on the table's unique
/// constraint with `ON CONFLICT DO NOTHING` semantics: the losing save
/// re-reads the surviving row to report its short URL. Soft delete is a
/// `deleted_at` stamp; reads of owned URLs only return active rows.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn now_unix_seconds() -> i64 {
    Timestamp::now().as_second()
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn save(&self, record: UrlRecord) -> Result<SaveOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO urls (original_url, short_url, url_id, user_id, deleted_at)
            VALUES ($1, $2, $3, $4, NULL)
            ON CONFLICT (original_url) DO NOTHING
            "#,
        )
        .bind(&record.original_url)
        .bind(&record.short_url)
        .bind(&record.generated_id)
        .bind(&record.owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            return Ok(SaveOutcome::Created);
        }

        // Zero rows affected means another record already claims this URL.
        // Re-read the surviving row to report its short URL to the loser.
        let row = sqlx::query(
            r#"
            SELECT short_url
            FROM urls
            WHERE original_url = $1
            LIMIT 1
            "#,
        )
        .bind(&record.original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            warn!(
                original_url = %record.original_url,
                "conflicting row vanished before re-read"
            );
            return Err(StorageError::InvalidData(format!(
                "no surviving row for conflicting url '{}'",
                record.original_url
            )));
        };

        let existing_short_url: String = row.try_get("short_url").map_err(map_sqlx_error)?;

        Ok(SaveOutcome::Conflict { existing_short_url })
    }

    async fn get(&self, id: &str) -> Result<Lookup> {
        let row = sqlx::query(
            r#"
            SELECT original_url, deleted_at
            FROM urls
            WHERE url_id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(Lookup::Missing);
        };

        let deleted_at: Option<i64> = row.try_get("deleted_at").map_err(map_sqlx_error)?;
        if deleted_at.is_some() {
            return Ok(Lookup::Deleted);
        }

        let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;

        Ok(Lookup::Active(original_url))
    }

    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<()> {
        // One transaction for the whole batch; dropping it on an early
        // return rolls back every statement issued so far.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO urls (original_url, short_url, url_id, user_id, deleted_at)
                VALUES ($1, $2, $3, $4, NULL)
                "#,
            )
            .bind(&record.original_url)
            .bind(&record.short_url)
            .bind(&record.generated_id)
            .bind(&record.owner_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn get_urls(&self, owner_id: &str) -> Result<Vec<OwnedUrl>> {
        let rows = sqlx::query(
            r#"
            SELECT original_url, short_url
            FROM urls
            WHERE user_id = $1
              AND deleted_at IS NULL
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut urls = Vec::with_capacity(rows.len());
        for row in rows {
            urls.push(OwnedUrl {
                original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
                short_url: row.try_get("short_url").map_err(map_sqlx_error)?,
            });
        }

        Ok(urls)
    }

    async fn delete_urls(&self, owner_id: &str, ids: &[String]) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE urls
            SET deleted_at = $1
            WHERE user_id = $2
              AND url_id = ANY($3)
              AND deleted_at IS NULL
            "#,
        )
        .bind(now_unix_seconds())
        .bind(owner_id)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
