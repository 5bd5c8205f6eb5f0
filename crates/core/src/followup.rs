//! Agent follow-up status.
//!
//! Follow-up is recorded by agents and is never derived from the expiry
//! date: a policy may be `expired` and `confirmed` at the same time
//! (the owner confirmed intent to renew, the renewal itself is pending).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const FOLLOWUP_NONE: &str = "none";
pub const FOLLOWUP_CONFIRMED: &str = "confirmed";
pub const FOLLOWUP_PENDING: &str = "pending";
pub const FOLLOWUP_MISSED: &str = "missed";

/// Every value the `followup_status` column may hold.
pub const VALID_FOLLOWUP_STATUSES: &[&str] = &[
    FOLLOWUP_NONE,
    FOLLOWUP_CONFIRMED,
    FOLLOWUP_PENDING,
    FOLLOWUP_MISSED,
];

/// Values an agent may set explicitly. `none` is only reachable by clearing.
pub const SETTABLE_FOLLOWUP_STATUSES: &[&str] =
    &[FOLLOWUP_CONFIRMED, FOLLOWUP_PENDING, FOLLOWUP_MISSED];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupStatus {
    #[default]
    None,
    Confirmed,
    Pending,
    Missed,
}

impl FollowupStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            FOLLOWUP_NONE => Ok(Self::None),
            FOLLOWUP_CONFIRMED => Ok(Self::Confirmed),
            FOLLOWUP_PENDING => Ok(Self::Pending),
            FOLLOWUP_MISSED => Ok(Self::Missed),
            _ => Err(CoreError::Validation(format!(
                "Invalid followup_status '{s}'. Must be one of: {}",
                VALID_FOLLOWUP_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => FOLLOWUP_NONE,
            Self::Confirmed => FOLLOWUP_CONFIRMED,
            Self::Pending => FOLLOWUP_PENDING,
            Self::Missed => FOLLOWUP_MISSED,
        }
    }
}

/// Parse a status an agent is trying to set.
///
/// Rejects `none` (use the clear operation instead) and unknown values.
pub fn parse_settable_status(s: &str) -> Result<FollowupStatus, CoreError> {
    match FollowupStatus::from_str_value(s.trim())? {
        FollowupStatus::None => Err(CoreError::Validation(format!(
            "followup_status must be one of: {}; use the clear operation to reset it",
            SETTABLE_FOLLOWUP_STATUSES.join(", ")
        ))),
        status => Ok(status),
    }
}
