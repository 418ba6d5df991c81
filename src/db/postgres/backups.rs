use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{
        error::DbResult,
        repos::{BackupRepo, SortOrder},
    },
    models::{BackupRecord, CreateBackupRecord, TriggerSummary},
};

/// PostgreSQL catalog.
///
/// Reads go to the primary. Retention decisions must see the row that was
/// just inserted, so there is no replica routing here.
pub struct PostgresBackupRepo {
    pool: PgPool,
}

impl PostgresBackupRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &PgRow) -> BackupRecord {
        BackupRecord {
            id: row.get("id"),
            trigger: row.get("trigger_name"),
            adapter: row.get("adapter"),
            filename: row.get("filename"),
            bucket: row.get("bucket"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl BackupRepo for PostgresBackupRepo {
    async fn create(&self, input: CreateBackupRecord) -> DbResult<BackupRecord> {
        let id = Uuid::new_v4();

        let row = sqlx::query(
            r#"
            INSERT INTO backup_records (id, trigger_name, adapter, filename, bucket, created_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
            RETURNING id, trigger_name, adapter, filename, bucket, created_at
            "#,
        )
        .bind(id)
        .bind(&input.trigger)
        .bind(&input.adapter)
        .bind(&input.filename)
        .bind(&input.bucket)
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::record_from_row(&row))
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<BackupRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, trigger_name, adapter, filename, bucket, created_at
            FROM backup_records
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn list_by_trigger(
        &self,
        trigger: &str,
        order: SortOrder,
    ) -> DbResult<Vec<BackupRecord>> {
        let query = format!(
            r#"
            SELECT id, trigger_name, adapter, filename, bucket, created_at
            FROM backup_records
            WHERE trigger_name = $1
            ORDER BY created_at {}, id {}
            "#,
            order.as_sql(),
            order.as_sql()
        );

        let rows = sqlx::query(&query)
            .bind(trigger)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(Self::record_from_row).collect())
    }

    async fn count_by_trigger(&self, trigger: &str) -> DbResult<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM backup_records
            WHERE trigger_name = $1
            "#,
        )
        .bind(trigger)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn list_triggers(&self) -> DbResult<Vec<TriggerSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT trigger_name, COUNT(*) as count, MAX(created_at) as latest_at
            FROM backup_records
            GROUP BY trigger_name
            ORDER BY trigger_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TriggerSummary {
                trigger: row.get("trigger_name"),
                count: row.get("count"),
                latest_at: row.get("latest_at"),
            })
            .collect())
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM backup_records
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
