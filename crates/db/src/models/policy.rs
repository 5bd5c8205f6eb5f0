//! Policy entity model and DTOs.

use policydesk_core::policy::PolicyRecord;
use policydesk_core::types::{CalendarDate, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A policy row from the `policies` table.
///
/// Bucket and lifecycle state are derived per request and are not columns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Policy {
    pub id: DbId,
    pub plate: String,
    pub owner: String,
    pub contact: String,
    pub company: String,
    pub start_date: CalendarDate,
    pub expiry_date: CalendarDate,
    pub followup_status: String,
    pub renewed_date: Option<CalendarDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PolicyRecord for Policy {
    fn expiry_date(&self) -> CalendarDate {
        self.expiry_date
    }

    fn renewed_date(&self) -> Option<CalendarDate> {
        self.renewed_date
    }

    fn company(&self) -> &str {
        &self.company
    }
}

/// DTO for inserting a policy. Fields are already normalized and validated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePolicy {
    pub plate: String,
    pub owner: String,
    pub contact: String,
    pub company: String,
    pub start_date: CalendarDate,
    pub expiry_date: CalendarDate,
}

/// DTO for patching a policy. All fields are optional.
///
/// `expiry_date` is absent: it only moves through [`crate::repositories::PolicyRepo::renew`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePolicy {
    pub plate: Option<String>,
    pub owner: Option<String>,
    pub contact: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<CalendarDate>,
}

/// Row filter for policy listings and exports.
///
/// The expiry bounds form the half-open range `(expires_after, expires_until]`
/// produced by `policydesk_core::expiry::bucket_range`.
#[derive(Debug, Clone, Default)]
pub struct PolicyFilter {
    /// Case-insensitive exact insurer name.
    pub company: Option<String>,
    pub expires_after: Option<CalendarDate>,
    pub expires_until: Option<CalendarDate>,
    /// Substring matched against plate, owner and contact.
    pub search: Option<String>,
}
