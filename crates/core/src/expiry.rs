//! Expiry classification.
//!
//! A policy's bucket is never stored: it is recomputed from
//! `(expiry_date, today)` on every query. Comparisons are made on calendar
//! dates in the business timezone, never on instants, so a policy expiring
//! "today" stays in [`ExpiryBucket::Today`] for the whole local day.

use chrono::{Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CalendarDate, Timestamp};

/// Days ahead (inclusive) that count as "expiring this week".
pub const WEEK_WINDOW_DAYS: i64 = 7;

/// Days ahead (inclusive) that count as "expiring this month".
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Wire format for all calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const BUCKET_EXPIRED: &str = "expired";
pub const BUCKET_TODAY: &str = "today";
pub const BUCKET_WEEK: &str = "week";
pub const BUCKET_MONTH: &str = "month";
pub const BUCKET_ACTIVE: &str = "active";

/// All valid bucket names, in classification order.
pub const VALID_BUCKETS: &[&str] = &[
    BUCKET_EXPIRED,
    BUCKET_TODAY,
    BUCKET_WEEK,
    BUCKET_MONTH,
    BUCKET_ACTIVE,
];

/// Mutually exclusive expiry classification of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryBucket {
    /// `expiry < today`
    Expired,
    /// `expiry == today`
    Today,
    /// `today < expiry <= today + 7`
    Week,
    /// `today + 7 < expiry <= today + 30`
    Month,
    /// `expiry > today + 30`
    Active,
}

impl ExpiryBucket {
    /// Parse a bucket name from a query string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            BUCKET_EXPIRED => Ok(Self::Expired),
            BUCKET_TODAY => Ok(Self::Today),
            BUCKET_WEEK => Ok(Self::Week),
            BUCKET_MONTH => Ok(Self::Month),
            BUCKET_ACTIVE => Ok(Self::Active),
            _ => Err(CoreError::Validation(format!(
                "Invalid bucket '{s}'. Must be one of: {}",
                VALID_BUCKETS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => BUCKET_EXPIRED,
            Self::Today => BUCKET_TODAY,
            Self::Week => BUCKET_WEEK,
            Self::Month => BUCKET_MONTH,
            Self::Active => BUCKET_ACTIVE,
        }
    }

    /// Whether this bucket counts as "expiring" in dashboard summaries.
    ///
    /// The canonical merge rule: `expiring = today + week + month`.
    pub fn is_expiring(&self) -> bool {
        matches!(self, Self::Today | Self::Week | Self::Month)
    }
}

/// Classify an expiry date relative to `today`.
///
/// Rules are checked in order and the first match wins, which makes the
/// buckets exhaustive and mutually exclusive over the whole date line.
pub fn classify(expiry_date: CalendarDate, today: CalendarDate) -> ExpiryBucket {
    let days_left = (expiry_date - today).num_days();
    if days_left < 0 {
        ExpiryBucket::Expired
    } else if days_left == 0 {
        ExpiryBucket::Today
    } else if days_left <= WEEK_WINDOW_DAYS {
        ExpiryBucket::Week
    } else if days_left <= MONTH_WINDOW_DAYS {
        ExpiryBucket::Month
    } else {
        ExpiryBucket::Active
    }
}

/// Calendar date of `now` as seen from the business timezone.
pub fn business_today(now: Timestamp, offset: FixedOffset) -> CalendarDate {
    now.with_timezone(&offset).date_naive()
}

/// Build a fixed offset from whole minutes east of UTC.
///
/// Offsets outside ±24h are rejected.
pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, CoreError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            CoreError::Validation(format!("UTC offset of {minutes} minutes is out of range"))
        })
}

/// Parse a `YYYY-MM-DD` date, naming `field` in the error.
pub fn parse_date(value: &str, field: &str) -> Result<CalendarDate, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!(
            "{field} must be a date in YYYY-MM-DD format, got '{trimmed}'"
        ))
    })
}

/// Parse an optional date field, failing when it is absent.
pub fn require_date(value: Option<&str>, field: &str) -> Result<CalendarDate, CoreError> {
    parse_date(value.unwrap_or_default(), field)
}

/// Half-open date range `(after, until]` covering a bucket.
///
/// `None` means unbounded on that side. Storage layers use this to filter
/// by bucket without duplicating the classification rules.
pub fn bucket_range(
    bucket: ExpiryBucket,
    today: CalendarDate,
) -> (Option<CalendarDate>, Option<CalendarDate>) {
    let day = |n: i64| today + Duration::days(n);
    match bucket {
        ExpiryBucket::Expired => (None, Some(day(-1))),
        ExpiryBucket::Today => (Some(day(-1)), Some(today)),
        ExpiryBucket::Week => (Some(today), Some(day(WEEK_WINDOW_DAYS))),
        ExpiryBucket::Month => (Some(day(WEEK_WINDOW_DAYS)), Some(day(MONTH_WINDOW_DAYS))),
        ExpiryBucket::Active => (Some(day(MONTH_WINDOW_DAYS)), None),
    }
}
