//! Repository for the `sms_logs` table.

use policydesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::sms_log::{CreateSmsLog, SmsLog};

const COLUMNS: &str = "id, phone_number, message, cost, status, is_read, created_at";

/// Append-only log access plus read-flag updates.
pub struct SmsLogRepo;

impl SmsLogRepo {
    pub async fn create(pool: &PgPool, input: &CreateSmsLog) -> Result<SmsLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO sms_logs (phone_number, message, cost, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SmsLog>(&query)
            .bind(&input.phone_number)
            .bind(&input.message)
            .bind(input.cost)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Newest first, optionally restricted to unread entries.
    pub async fn list(
        pool: &PgPool,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SmsLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sms_logs
             WHERE ($1 = false OR is_read = false)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SmsLog>(&query)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn unread_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sms_logs WHERE is_read = false")
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Mark one entry read. Returns `None` if no row with the given `id` exists.
    pub async fn mark_read(pool: &PgPool, id: DbId) -> Result<Option<SmsLog>, sqlx::Error> {
        let query = format!("UPDATE sms_logs SET is_read = true WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, SmsLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark every unread entry read, returning how many changed.
    pub async fn mark_all_read(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE sms_logs SET is_read = true WHERE is_read = false")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
