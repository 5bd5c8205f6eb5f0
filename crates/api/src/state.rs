use std::sync::Arc;

use chrono::Utc;
use policydesk_core::expiry::business_today;
use policydesk_core::types::CalendarDate;
use policydesk_events::{ChangeEvent, EventBus};

use crate::cache::ReportCache;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: policydesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (dashboard clients).
    pub ws_manager: Arc<WsManager>,
    /// Change events published by write handlers.
    pub event_bus: Arc<EventBus>,
    /// Dashboard reports keyed by kind, parameters and business date.
    pub report_cache: Arc<ReportCache>,
}

impl AppState {
    /// Today's date in the business timezone.
    pub fn today(&self) -> CalendarDate {
        business_today(Utc::now(), self.config.business_offset)
    }

    /// Record a policy write: drop cached reports, then notify subscribers.
    ///
    /// Invalidation happens before publishing so a dashboard reacting to the
    /// event never reads a stale report.
    pub fn policies_changed(&self, event: ChangeEvent) {
        self.report_cache.invalidate_all();
        self.event_bus.publish(event);
    }
}
