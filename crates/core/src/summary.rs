//! Dashboard aggregates over a set of policies.
//!
//! All functions take the reference date explicitly and work on any
//! [`PolicyRecord`], so the API layer can feed them rows straight from the
//! repository.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expiry::{classify, ExpiryBucket};
use crate::policy::PolicyRecord;
use crate::types::CalendarDate;

/// Chart colors for the company distribution, assigned by rank.
pub const COMPANY_PALETTE: &[&str] = &[
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8", "#82CA9D", "#A4DE6C", "#D0ED57",
];

/// Headline counts for the dashboard.
///
/// `expiring` merges the `today`, `week` and `month` buckets, so
/// `active + expiring + expired == created` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub created: u64,
    pub active: u64,
    pub expiring: u64,
    pub expired: u64,
}

/// Count policies per bucket under the canonical merge rule.
pub fn summarize<P: PolicyRecord>(policies: &[P], today: CalendarDate) -> Summary {
    policies.iter().fold(Summary::default(), |mut acc, policy| {
        acc.created += 1;
        match classify(policy.expiry_date(), today) {
            ExpiryBucket::Expired => acc.expired += 1,
            ExpiryBucket::Active => acc.active += 1,
            ExpiryBucket::Today | ExpiryBucket::Week | ExpiryBucket::Month => acc.expiring += 1,
        }
        acc
    })
}

/// Policies grouped into the tabs of the expiry report.
///
/// `active` policies are not part of the report.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryReport<T> {
    pub today: Vec<T>,
    pub week: Vec<T>,
    pub month: Vec<T>,
    pub expired: Vec<T>,
}

impl<T> Default for ExpiryReport<T> {
    fn default() -> Self {
        Self {
            today: Vec::new(),
            week: Vec::new(),
            month: Vec::new(),
            expired: Vec::new(),
        }
    }
}

/// Split policies into report tabs, each sorted by expiry date ascending.
pub fn expiry_report<P: PolicyRecord>(policies: Vec<P>, today: CalendarDate) -> ExpiryReport<P> {
    let mut report = ExpiryReport::default();
    for policy in policies {
        match classify(policy.expiry_date(), today) {
            ExpiryBucket::Today => report.today.push(policy),
            ExpiryBucket::Week => report.week.push(policy),
            ExpiryBucket::Month => report.month.push(policy),
            ExpiryBucket::Expired => report.expired.push(policy),
            ExpiryBucket::Active => {}
        }
    }
    for tab in [
        &mut report.today,
        &mut report.week,
        &mut report.month,
        &mut report.expired,
    ] {
        tab.sort_by_key(|p| p.expiry_date());
    }
    report
}

/// One slice of the market-share chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyShare {
    pub name: String,
    pub value: u64,
    pub color: &'static str,
}

/// Count policies per insurer, largest first (ties broken by name).
pub fn company_distribution<P: PolicyRecord>(policies: &[P]) -> Vec<CompanyShare> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for policy in policies {
        *counts.entry(policy.company()).or_default() += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    // BTreeMap iteration is already name-ordered; a stable sort keeps that for ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (name, value))| CompanyShare {
            name: name.to_string(),
            value,
            color: COMPANY_PALETTE[rank % COMPANY_PALETTE.len()],
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Minimal in-memory policy for aggregation tests.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Stub {
        pub expiry: CalendarDate,
        pub renewed: Option<CalendarDate>,
        pub company: String,
    }

    impl PolicyRecord for Stub {
        fn expiry_date(&self) -> CalendarDate {
            self.expiry
        }
        fn renewed_date(&self) -> Option<CalendarDate> {
            self.renewed
        }
        fn company(&self) -> &str {
            &self.company
        }
    }

    pub(crate) fn today() -> CalendarDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    pub(crate) fn expiring_in(days: i64) -> Stub {
        Stub {
            expiry: today() + Duration::days(days),
            renewed: None,
            company: "Jubilee".to_string(),
        }
    }

    fn with_company(days: i64, company: &str) -> Stub {
        Stub {
            company: company.to_string(),
            ..expiring_in(days)
        }
    }

    #[test]
    fn summary_merges_near_buckets_into_expiring() {
        let policies = vec![expiring_in(-1), expiring_in(0), expiring_in(5)];
        assert_eq!(
            summarize(&policies, today()),
            Summary {
                created: 3,
                active: 0,
                expiring: 2,
                expired: 1,
            }
        );
    }

    #[test]
    fn summary_counts_always_sum_to_created() {
        let policies: Vec<Stub> = (-60..=60).step_by(3).map(expiring_in).collect();
        let summary = summarize(&policies, today());
        assert_eq!(summary.created, policies.len() as u64);
        assert_eq!(summary.active + summary.expiring + summary.expired, summary.created);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        assert_eq!(summarize::<Stub>(&[], today()), Summary::default());
    }

    #[test]
    fn expiry_report_splits_and_sorts_tabs() {
        let policies = vec![
            expiring_in(20),
            expiring_in(3),
            expiring_in(-5),
            expiring_in(0),
            expiring_in(1),
            expiring_in(-40),
            expiring_in(120),
            expiring_in(9),
        ];
        let report = expiry_report(policies, today());

        assert_eq!(report.today, vec![expiring_in(0)]);
        assert_eq!(report.week, vec![expiring_in(1), expiring_in(3)]);
        assert_eq!(report.month, vec![expiring_in(9), expiring_in(20)]);
        assert_eq!(report.expired, vec![expiring_in(-40), expiring_in(-5)]);
    }

    #[test]
    fn expiry_report_tabs_do_not_overlap_with_summary() {
        let policies: Vec<Stub> = (-10..=40).map(expiring_in).collect();
        let summary = summarize(&policies, today());
        let report = expiry_report(policies, today());
        let report_expiring = (report.today.len() + report.week.len() + report.month.len()) as u64;
        assert_eq!(report_expiring, summary.expiring);
        assert_eq!(report.expired.len() as u64, summary.expired);
    }

    #[test]
    fn company_distribution_ranks_by_count_then_name() {
        let policies = vec![
            with_company(10, "Madison"),
            with_company(10, "Britam"),
            with_company(10, "Jubilee"),
            with_company(10, "Jubilee"),
            with_company(10, "Britam"),
            with_company(10, "APA"),
        ];
        let shares = company_distribution(&policies);
        let names: Vec<(&str, u64)> = shares.iter().map(|s| (s.name.as_str(), s.value)).collect();
        assert_eq!(
            names,
            vec![("Britam", 2), ("Jubilee", 2), ("APA", 1), ("Madison", 1)]
        );
        assert_eq!(shares[0].color, COMPANY_PALETTE[0]);
        assert_eq!(shares[3].color, COMPANY_PALETTE[3]);
    }

    #[test]
    fn palette_cycles_for_many_companies() {
        let policies: Vec<Stub> = (0..10)
            .map(|i| with_company(10, &format!("Insurer {i}")))
            .collect();
        let shares = company_distribution(&policies);
        assert_eq!(shares.len(), 10);
        assert_eq!(shares[8].color, COMPANY_PALETTE[0]);
    }
}
