//! TTL cache for dashboard reports.
//!
//! Reports are recomputed from the full policy set, so they are cached per
//! `(kind, parameters, business date)`. Keying on the business date makes
//! every entry roll over at local midnight when buckets shift. Any policy
//! write calls [`ReportCache::invalidate_all`].
//!
//! A report computed while an invalidation happens may describe the rows
//! from before the write, so it is handed to its caller but never kept.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use policydesk_core::types::CalendarDate;
use serde_json::Value;

/// Upper bound on cached report variants.
const MAX_ENTRIES: u64 = 1_000;

/// Which report an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Summary,
    Trends,
    ExpiryReport,
    CompanyDistribution,
}

/// Cache key for one rendered report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub kind: ReportKind,
    /// Normalized query parameters, e.g. `"month:12"`.
    pub params: String,
    pub business_date: CalendarDate,
}

impl ReportKey {
    pub fn new(kind: ReportKind, params: impl Into<String>, business_date: CalendarDate) -> Self {
        Self {
            kind,
            params: params.into(),
            business_date,
        }
    }
}

/// Report JSON keyed by [`ReportKey`], expiring after a fixed TTL.
#[derive(Debug, Clone)]
pub struct ReportCache {
    inner: Cache<ReportKey, Arc<Value>>,
    /// Bumped by every invalidation.
    generation: Arc<AtomicU64>,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return the cached report or compute, store and return it.
    ///
    /// Errors are returned as-is and nothing is cached for the key.
    pub async fn get_or_try_compute<E, F, Fut>(&self, key: ReportKey, compute: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(cached) = self.inner.get(&key).await {
            tracing::trace!(kind = ?key.kind, params = %key.params, "Report cache hit");
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let report = Arc::new(compute().await?);

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(kind = ?key.kind, "Report invalidated while computing; not cached");
            return Ok(report);
        }
        self.inner.insert(key.clone(), Arc::clone(&report)).await;
        // An invalidation between the check and the insert may have missed
        // the new entry.
        if self.generation.load(Ordering::SeqCst) != generation {
            self.inner.invalidate(&key).await;
        }
        Ok(report)
    }

    /// Drop every cached report, including ones still being computed.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_all();
    }
}
