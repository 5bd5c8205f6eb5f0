//! Time-bucketed policy trends for the dashboard chart.
//!
//! Each policy is placed in the calendar period containing its expiry
//! date and counted as `expired` or `active` depending on its bucket
//! relative to today. Renewals are counted in the period containing the
//! renewal date. Periods between the first and last populated one are
//! filled with zero rows so the chart has no gaps.
//!
//! The dashboard shows a window of periods ending with the one containing
//! today (see [`recent_window`]), so a handful of long-dated policies cannot
//! push the current period off the chart.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::expiry::{classify, ExpiryBucket};
use crate::policy::PolicyRecord;
use crate::types::CalendarDate;

/// Default number of periods returned by the trends endpoint.
pub const DEFAULT_TREND_PERIODS: usize = 12;

/// Upper bound on periods returned by the trends endpoint.
pub const MAX_TREND_PERIODS: usize = 60;

pub const PERIOD_WEEK: &str = "week";
pub const PERIOD_MONTH: &str = "month";
pub const PERIOD_YEAR: &str = "year";

pub const VALID_PERIODS: &[&str] = &[PERIOD_WEEK, PERIOD_MONTH, PERIOD_YEAR];

/// Calendar granularity for trend grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPeriod {
    /// ISO week starting on Monday, labelled `YYYY-Www`.
    Week,
    /// Calendar month, labelled `YYYY-MM`.
    #[default]
    Month,
    /// Calendar year, labelled `YYYY`.
    Year,
}

impl TrendPeriod {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            PERIOD_WEEK => Ok(Self::Week),
            PERIOD_MONTH => Ok(Self::Month),
            PERIOD_YEAR => Ok(Self::Year),
            _ => Err(CoreError::Validation(format!(
                "Invalid period '{s}'. Must be one of: {}",
                VALID_PERIODS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => PERIOD_WEEK,
            Self::Month => PERIOD_MONTH,
            Self::Year => PERIOD_YEAR,
        }
    }

    /// First day of the period containing `date`.
    pub fn start_of(&self, date: CalendarDate) -> CalendarDate {
        match self {
            Self::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// First day of the period after the one starting at `start`.
    fn next_start(&self, start: CalendarDate) -> Option<CalendarDate> {
        match self {
            Self::Week => start.checked_add_signed(Duration::days(7)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::Year => start.checked_add_months(Months::new(12)),
        }
    }

    /// First day of the period before the one starting at `start`.
    fn previous_start(&self, start: CalendarDate) -> Option<CalendarDate> {
        match self {
            Self::Week => start.checked_sub_signed(Duration::days(7)),
            Self::Month => start.checked_sub_months(Months::new(1)),
            Self::Year => start.checked_sub_months(Months::new(12)),
        }
    }

    /// Human-readable label of the period starting at `start`.
    pub fn label(&self, start: CalendarDate) -> String {
        match self {
            Self::Week => {
                let iso = start.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Self::Month => start.format("%Y-%m").to_string(),
            Self::Year => start.format("%Y").to_string(),
        }
    }
}

/// Counts for one period of the trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub active: u64,
    pub expired: u64,
    pub renewed: u64,
}

#[derive(Default)]
struct Counts {
    active: u64,
    expired: u64,
    renewed: u64,
}

/// Group policies by period, oldest period first.
pub fn trends<P: PolicyRecord>(
    policies: &[P],
    period: TrendPeriod,
    today: CalendarDate,
) -> Vec<TrendPoint> {
    let mut by_period: BTreeMap<CalendarDate, Counts> = BTreeMap::new();

    for policy in policies {
        let slot = by_period
            .entry(period.start_of(policy.expiry_date()))
            .or_default();
        if classify(policy.expiry_date(), today) == ExpiryBucket::Expired {
            slot.expired += 1;
        } else {
            slot.active += 1;
        }

        if let Some(renewed) = policy.renewed_date() {
            by_period.entry(period.start_of(renewed)).or_default().renewed += 1;
        }
    }

    let (Some(&first), Some(&last)) = (by_period.keys().next(), by_period.keys().next_back())
    else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut cursor = Some(first);
    while let Some(start) = cursor.filter(|s| *s <= last) {
        let counts = by_period.remove(&start).unwrap_or_default();
        points.push(TrendPoint {
            label: period.label(start),
            active: counts.active,
            expired: counts.expired,
            renewed: counts.renewed,
        });
        cursor = period.next_start(start);
    }
    points
}

/// The `limit` periods ending with the one containing `today`, oldest first.
///
/// Periods without data become zero rows and periods after today's are
/// dropped. No points in, no points out.
pub fn recent_window(
    points: Vec<TrendPoint>,
    period: TrendPeriod,
    today: CalendarDate,
    limit: usize,
) -> Vec<TrendPoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut starts = Vec::with_capacity(limit);
    let mut cursor = Some(period.start_of(today));
    while let Some(start) = cursor.filter(|_| starts.len() < limit) {
        starts.push(start);
        cursor = period.previous_start(start);
    }

    let mut by_label: HashMap<String, TrendPoint> =
        points.into_iter().map(|p| (p.label.clone(), p)).collect();
    starts
        .into_iter()
        .rev()
        .map(|start| {
            let label = period.label(start);
            by_label.remove(&label).unwrap_or(TrendPoint {
                label,
                active: 0,
                expired: 0,
                renewed: 0,
            })
        })
        .collect()
}

/// Clamp a requested number of periods to `1..=MAX_TREND_PERIODS`.
pub fn clamp_periods(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_TREND_PERIODS)
        .clamp(1, MAX_TREND_PERIODS)
}
