//! Renewal lifecycle of a policy.
//!
//! ```text
//! Active ──(time)──> ExpiringSoon ──(time)──> Expired ──(renew)──> Renewed
//!   ^                                                                 │
//!   └────────────────(new expiry beyond the 30-day window)────────────┘
//! ```
//!
//! Time-driven transitions are implicit: the state is recomputed from the
//! dates on every read. The only explicit transition is [`renew`].

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::expiry::{classify, ExpiryBucket, MONTH_WINDOW_DAYS};
use crate::types::CalendarDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    ExpiringSoon,
    Expired,
    Renewed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
            Self::Renewed => "renewed",
        }
    }
}

/// Derive the lifecycle state from stored dates.
///
/// A renewal only marks the policy `Renewed` while it falls inside the
/// current term's expiring window (`renewed_date > expiry - 30 days`). Once
/// the renewal is older than that, the policy ages through `ExpiringSoon`
/// like any other.
pub fn lifecycle_state(
    expiry_date: CalendarDate,
    renewed_date: Option<CalendarDate>,
    today: CalendarDate,
) -> LifecycleState {
    match classify(expiry_date, today) {
        ExpiryBucket::Expired => LifecycleState::Expired,
        ExpiryBucket::Active => LifecycleState::Active,
        ExpiryBucket::Today | ExpiryBucket::Week | ExpiryBucket::Month => {
            let window_start = expiry_date - Duration::days(MONTH_WINDOW_DAYS);
            match renewed_date {
                Some(renewed) if renewed > window_start => LifecycleState::Renewed,
                _ => LifecycleState::ExpiringSoon,
            }
        }
    }
}

/// The outcome of a successful renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renewal {
    pub expiry_date: CalendarDate,
    pub renewed_date: CalendarDate,
    pub bucket: ExpiryBucket,
    pub state: LifecycleState,
}

/// Plan a renewal of a policy currently in `current`.
///
/// Only an `Expired` policy may be renewed; the new expiry must be strictly
/// after `today`. The renewal is recorded as happening on `today`.
pub fn renew(
    current: LifecycleState,
    new_expiry: CalendarDate,
    today: CalendarDate,
) -> Result<Renewal, CoreError> {
    if current != LifecycleState::Expired {
        return Err(CoreError::Conflict(format!(
            "Only expired policies can be renewed (current state: {})",
            current.as_str()
        )));
    }
    if new_expiry <= today {
        return Err(CoreError::Validation(format!(
            "expiry_date ({new_expiry}) must be after today ({today})"
        )));
    }
    Ok(Renewal {
        expiry_date: new_expiry,
        renewed_date: today,
        bucket: classify(new_expiry, today),
        state: lifecycle_state(new_expiry, Some(today), today),
    })
}
