//! PostgreSQL-backed document store.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Collection, Document, StoreError, StoreResult};
use crate::models::{DayRecord, ScheduleDocument, ScheduleEvent};

/// Document store over the `days` and `schedules` tables.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate an insert failure, recognising unique-constraint violations.
fn insert_error<D: Document>(err: sqlx::Error, key: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey {
                collection: D::COLLECTION,
                key: key.to_string(),
            };
        }
    }
    StoreError::Database(err)
}

fn ensure_replaced<D: Document>(rows_affected: u64, key: &str) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound {
            collection: D::COLLECTION,
            key: key.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl Collection<DayRecord> for PgDocumentStore {
    async fn insert_one(&self, doc: &DayRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO days (id, date, schedule) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(&doc.date)
            .bind(&doc.schedule)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error::<DayRecord>(e, &doc.date))?;
        Ok(())
    }

    async fn find_one_and_replace(&self, key: &str, doc: &DayRecord) -> StoreResult<()> {
        // The date is the key, so schedule is the only field to rewrite.
        let result = sqlx::query("UPDATE days SET schedule = $2, updated_at = NOW() WHERE date = $1")
            .bind(key)
            .bind(&doc.schedule)
            .execute(&self.pool)
            .await?;
        ensure_replaced::<DayRecord>(result.rows_affected(), key)
    }

    async fn find_one(&self, key: &str) -> StoreResult<Option<DayRecord>> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT date, schedule FROM days WHERE date = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(date, schedule)| DayRecord { schedule, date }))
    }
}

#[async_trait]
impl Collection<ScheduleDocument> for PgDocumentStore {
    async fn insert_one(&self, doc: &ScheduleDocument) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO schedules (id, name, friendly_name, schedule)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&doc.name)
        .bind(&doc.friendly_name)
        .bind(Json(&doc.schedule))
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error::<ScheduleDocument>(e, &doc.name))?;
        Ok(())
    }

    async fn find_one_and_replace(&self, key: &str, doc: &ScheduleDocument) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET friendly_name = $2, schedule = $3, updated_at = NOW()
            WHERE name = $1
            "#,
        )
        .bind(key)
        .bind(&doc.friendly_name)
        .bind(Json(&doc.schedule))
        .execute(&self.pool)
        .await?;
        ensure_replaced::<ScheduleDocument>(result.rows_affected(), key)
    }

    async fn find_one(&self, key: &str) -> StoreResult<Option<ScheduleDocument>> {
        let row = sqlx::query_as::<_, (String, String, Json<Vec<ScheduleEvent>>)>(
            "SELECT name, friendly_name, schedule FROM schedules WHERE name = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, friendly_name, Json(schedule))| ScheduleDocument {
            name,
            friendly_name,
            schedule,
        }))
    }
}
