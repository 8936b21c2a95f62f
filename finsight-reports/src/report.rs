//! Presentation stage: assemble renderable report sections
//!
//! A report is a pure mapping of the filtered set and its aggregates into
//! sections. Each configuration flag independently gates one section: a
//! disabled section is omitted entirely (`None`), never rendered empty. The
//! whole report is rebuilt wholesale on every relevant change; there is no
//! incremental patching.

use crate::buckets::{group_by_date, plan_breakdown, DateBuckets, PlanBucket};
use crate::filter::{apply_registration_filters, apply_subscription_filters};
use crate::records::{CancellationState, RegistrationLog, Subscription};
use crate::stats::{rate, RegistrationStats, SubscriptionStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

/// Maximum number of rows in the detail table
pub const DETAIL_ROW_LIMIT: usize = 50;

/// User-editable report metadata
///
/// The flags control which sections render; they have no effect on the
/// filter or aggregation stages.
#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub title: String,
    pub subtitle: Option<String>,
    /// Logo URL or data URI forwarded to the rendering layer
    pub logo: Option<String>,
    pub include_summary: bool,
    pub include_charts: bool,
    pub include_table: bool,
    pub include_retention_analysis: bool,
    pub include_plan_breakdown: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Platform Report".to_string(),
            subtitle: None,
            logo: None,
            include_summary: true,
            include_charts: true,
            include_table: true,
            include_retention_analysis: true,
            include_plan_breakdown: true,
        }
    }
}

/// Detail table capped at [`DETAIL_ROW_LIMIT`] rows
#[derive(Debug, Clone, Serialize)]
pub struct DetailSection<T> {
    /// First rows of the filtered set, in the set's stable order
    pub rows: Vec<T>,
    /// Size of the filtered set before truncation
    pub total: usize,
    /// Present iff the filtered set exceeds the row limit
    pub truncation_notice: Option<String>,
}

impl<T: Clone> DetailSection<T> {
    fn build(filtered: &[T]) -> Self {
        let total = filtered.len();
        let rows: Vec<T> = filtered.iter().take(DETAIL_ROW_LIMIT).cloned().collect();
        let truncation_notice = if total > DETAIL_ROW_LIMIT {
            Some(format!(
                "Showing first {} of {} records",
                DETAIL_ROW_LIMIT, total
            ))
        } else {
            None
        };

        Self {
            rows,
            total,
            truncation_notice,
        }
    }
}

/// Retention and cancellation-risk cards
#[derive(Debug, Clone, Serialize)]
pub struct RetentionSection {
    pub renewing: usize,
    pub pending_cancellation: usize,
    pub canceled: usize,
    /// Share of renewing subscriptions, one decimal place
    pub retention_rate: f64,
}

impl RetentionSection {
    fn build(filtered: &[Subscription]) -> Self {
        let mut renewing = 0;
        let mut pending_cancellation = 0;
        let mut canceled = 0;

        for record in filtered {
            match record.cancellation_state() {
                CancellationState::Renewing => renewing += 1,
                CancellationState::PendingCancellation => pending_cancellation += 1,
                CancellationState::Canceled => canceled += 1,
            }
        }

        Self {
            renewing,
            pending_cancellation,
            canceled,
            retention_rate: rate(renewing, filtered.len()),
        }
    }
}

/// Renderable subscription report
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionReport {
    pub title: String,
    pub subtitle: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub summary: Option<SubscriptionStats>,
    pub trend: Option<DateBuckets>,
    pub plan_breakdown: Option<Vec<PlanBucket>>,
    pub retention: Option<RetentionSection>,
    pub detail: Option<DetailSection<Subscription>>,
}

/// Renderable registration report
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub title: String,
    pub subtitle: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub summary: Option<RegistrationStats>,
    pub trend: Option<DateBuckets>,
    pub detail: Option<DetailSection<RegistrationLog>>,
}

/// Build a subscription report from an already-filtered set
#[instrument(skip(filtered, config), fields(filtered = filtered.len()))]
pub fn build_subscription_report(
    filtered: &[Subscription],
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> SubscriptionReport {
    let report = SubscriptionReport {
        title: config.title.clone(),
        subtitle: config.subtitle.clone(),
        generated_at: now,
        summary: config
            .include_summary
            .then(|| SubscriptionStats::compute(filtered, now)),
        trend: config.include_charts.then(|| group_by_date(filtered)),
        plan_breakdown: config
            .include_plan_breakdown
            .then(|| plan_breakdown(filtered)),
        retention: config
            .include_retention_analysis
            .then(|| RetentionSection::build(filtered)),
        detail: config.include_table.then(|| DetailSection::build(filtered)),
    };

    info!(
        "Built subscription report '{}' over {} records",
        report.title,
        filtered.len()
    );
    report
}

/// Build a registration report from an already-filtered set
#[instrument(skip(filtered, config), fields(filtered = filtered.len()))]
pub fn build_registration_report(
    filtered: &[RegistrationLog],
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> RegistrationReport {
    let report = RegistrationReport {
        title: config.title.clone(),
        subtitle: config.subtitle.clone(),
        generated_at: now,
        summary: config
            .include_summary
            .then(|| RegistrationStats::compute(filtered)),
        trend: config.include_charts.then(|| group_by_date(filtered)),
        detail: config.include_table.then(|| DetailSection::build(filtered)),
    };

    info!(
        "Built registration report '{}' over {} records",
        report.title,
        filtered.len()
    );
    report
}

/// Convenience pipeline: filter, then build, in one call
///
/// The stages stay independently callable; this helper only spares callers
/// the plumbing when they do not need the intermediate filtered set.
pub fn subscription_report_pipeline(
    records: &[Subscription],
    criteria: &crate::filter::SubscriptionFilter,
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> SubscriptionReport {
    let filtered = apply_subscription_filters(records, criteria, now);
    build_subscription_report(&filtered, config, now)
}

/// Convenience pipeline for registration logs
pub fn registration_report_pipeline(
    records: &[RegistrationLog],
    criteria: &crate::filter::RegistrationFilter,
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> RegistrationReport {
    let filtered = apply_registration_filters(records, criteria, now);
    build_registration_report(&filtered, config, now)
}
