//! SMS log entity model and DTOs.

use policydesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sms_logs` table. Only `is_read` ever changes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SmsLog {
    pub id: DbId,
    pub phone_number: String,
    pub message: String,
    pub cost: f64,
    pub status: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for recording a provider send result.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSmsLog {
    pub phone_number: String,
    pub message: String,
    pub cost: f64,
    pub status: String,
}
