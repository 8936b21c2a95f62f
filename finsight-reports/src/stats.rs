//! Aggregation stage: summary statistics over a filtered record set
//!
//! Statistics are derived, recomputed-on-read values. They are never stored;
//! every report render recomputes them from the current filtered set.

use crate::records::{RegistrationLog, RegistrationStatus, Subscription, SubscriptionStatus};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

/// Percentage of `count` over `total`, rounded to one decimal place
///
/// Defined as 0 when the total is 0.
pub fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Summary statistics for a filtered set of subscriptions
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubscriptionStats {
    pub total: usize,

    // Per-status counts
    pub active: usize,
    pub trialing: usize,
    pub past_due: usize,
    pub unpaid: usize,
    pub canceled: usize,
    pub incomplete: usize,
    pub incomplete_expired: usize,
    pub unknown: usize,

    /// Health classification: active + trialing
    pub healthy: usize,
    /// Health classification: past_due + unpaid
    pub at_risk: usize,

    // Derived rates, one decimal place, 0 when total is 0
    pub active_rate: f64,
    pub churn_rate: f64,
    pub at_risk_rate: f64,

    /// Monthly recurring revenue: plan prices over active + trialing
    pub total_mrr: f64,
    /// Plan prices over past_due subscriptions
    pub at_risk_revenue: f64,

    /// Subscriptions whose current period ends inside the current calendar
    /// month, regardless of status
    pub expiring_this_month: usize,
}

impl SubscriptionStats {
    /// Compute statistics over the filtered set
    ///
    /// `now` anchors the "expiring this month" window; it is injected so the
    /// computation stays a pure function of its inputs.
    #[instrument(skip(records), fields(total = records.len()))]
    pub fn compute(records: &[Subscription], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.status {
                SubscriptionStatus::Active => stats.active += 1,
                SubscriptionStatus::Trialing => stats.trialing += 1,
                SubscriptionStatus::PastDue => stats.past_due += 1,
                SubscriptionStatus::Unpaid => stats.unpaid += 1,
                SubscriptionStatus::Canceled => stats.canceled += 1,
                SubscriptionStatus::Incomplete => stats.incomplete += 1,
                SubscriptionStatus::IncompleteExpired => stats.incomplete_expired += 1,
                SubscriptionStatus::Unknown => stats.unknown += 1,
            }

            if record.status.is_revenue_generating() {
                stats.total_mrr += record.plan_price();
            }
            if record.status == SubscriptionStatus::PastDue {
                stats.at_risk_revenue += record.plan_price();
            }

            if let Some(period_end) = record.current_period_end {
                if period_end.year() == now.year() && period_end.month() == now.month() {
                    stats.expiring_this_month += 1;
                }
            }
        }

        // Unions of the per-status counts, not separately re-filtered data
        stats.healthy = stats.active + stats.trialing;
        stats.at_risk = stats.past_due + stats.unpaid;

        stats.active_rate = rate(stats.active, stats.total);
        stats.churn_rate = rate(stats.canceled, stats.total);
        stats.at_risk_rate = rate(stats.at_risk, stats.total);

        debug!(
            "Computed subscription stats: total={}, healthy={}, mrr={:.2}",
            stats.total, stats.healthy, stats.total_mrr
        );
        stats
    }
}

/// Summary statistics for a filtered set of registration log entries
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationStats {
    pub total: usize,

    // Per-status counts
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    pub unknown: usize,

    // Derived rates, one decimal place, 0 when total is 0
    pub completion_rate: f64,
    pub failure_rate: f64,
    pub pending_rate: f64,
}

impl RegistrationStats {
    /// Compute statistics over the filtered set
    #[instrument(skip(records), fields(total = records.len()))]
    pub fn compute(records: &[RegistrationLog]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.status {
                RegistrationStatus::Pending => stats.pending += 1,
                RegistrationStatus::Completed => stats.completed += 1,
                RegistrationStatus::Failed => stats.failed += 1,
                RegistrationStatus::Unknown => stats.unknown += 1,
            }
        }

        stats.completion_rate = rate(stats.completed, stats.total);
        stats.failure_rate = rate(stats.failed, stats.total);
        stats.pending_rate = rate(stats.pending, stats.total);

        debug!(
            "Computed registration stats: total={}, completed={}",
            stats.total, stats.completed
        );
        stats
    }
}
