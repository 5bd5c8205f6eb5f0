//! Business-date rollover watcher.
//!
//! Buckets are relative to the business date, so at local midnight every
//! dashboard number can change without any write. This task notices the
//! date change, drops cached reports and tells subscribers to refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, Utc};
use policydesk_core::expiry::business_today;
use policydesk_core::types::CalendarDate;
use policydesk_events::bus::BUSINESS_DATE_CHANGED;
use policydesk_events::{ChangeEvent, EventBus};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::cache::ReportCache;

/// How often the business date is re-evaluated.
const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Tracks the last observed business date.
#[derive(Debug, Clone, Copy)]
pub struct DateWatch {
    current: CalendarDate,
}

impl DateWatch {
    pub fn new(today: CalendarDate) -> Self {
        Self { current: today }
    }

    /// Record `today`, returning it if it differs from the previous date.
    pub fn observe(&mut self, today: CalendarDate) -> Option<CalendarDate> {
        if today == self.current {
            return None;
        }
        self.current = today;
        Some(today)
    }
}

/// Run the rollover loop until `cancel` is triggered.
pub async fn run(
    offset: FixedOffset,
    report_cache: Arc<ReportCache>,
    event_bus: Arc<EventBus>,
    cancel: CancellationToken,
) {
    let mut watch = DateWatch::new(business_today(Utc::now(), offset));
    tracing::info!(
        interval_secs = CHECK_INTERVAL.as_secs(),
        "Date rollover watcher started"
    );

    let mut interval = tokio::time::interval(CHECK_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Date rollover watcher stopping");
                break;
            }
            _ = interval.tick() => {
                if let Some(today) = watch.observe(business_today(Utc::now(), offset)) {
                    tracing::info!(%today, "Business date changed");
                    report_cache.invalidate_all();
                    event_bus.publish(
                        ChangeEvent::new(BUSINESS_DATE_CHANGED).with_payload(&json!({ "date": today })),
                    );
                }
            }
        }
    }
}
