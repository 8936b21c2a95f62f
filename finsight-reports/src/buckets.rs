//! Grouping stage: date and plan breakdowns over a filtered record set

use crate::records::{RegistrationLog, Subscription};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// A record that can be placed in a calendar-day bucket
pub trait DatedRecord {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    /// Stable status label accumulated per bucket
    fn status_label(&self) -> &'static str;
}

impl DatedRecord for Subscription {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

impl DatedRecord for RegistrationLog {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

/// One calendar-day aggregation group
#[derive(Debug, Clone, Serialize)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub total: u32,
    /// Count per status label, deterministic iteration order
    pub status_counts: BTreeMap<&'static str, u32>,
}

/// Result of date bucketing: ascending buckets plus the undated remainder
///
/// Records without a parseable creation time are excluded from the buckets
/// and tallied here, so `buckets.total sum + undated == input length` always
/// holds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateBuckets {
    pub buckets: Vec<DateBucket>,
    pub undated: u32,
}

impl DateBuckets {
    /// Sum of all per-bucket totals
    pub fn bucketed_total(&self) -> u32 {
        self.buckets.iter().map(|bucket| bucket.total).sum()
    }
}

/// Bucket records by the calendar day of their creation time
///
/// Buckets are sorted ascending by date for trend display. A record with a
/// missing creation time never creates a malformed bucket; it is excluded
/// and reported via `undated`.
#[instrument(skip(records), fields(total = records.len()))]
pub fn group_by_date<R: DatedRecord>(records: &[R]) -> DateBuckets {
    let mut daily: HashMap<NaiveDate, DateBucket> = HashMap::new();
    let mut undated = 0u32;

    for record in records {
        match record.created_at() {
            Some(ts) => {
                let date = ts.date_naive();
                let bucket = daily.entry(date).or_insert_with(|| DateBucket {
                    date,
                    total: 0,
                    status_counts: BTreeMap::new(),
                });
                bucket.total += 1;
                *bucket.status_counts.entry(record.status_label()).or_insert(0) += 1;
            }
            None => undated += 1,
        }
    }

    let mut buckets: Vec<DateBucket> = daily.into_values().collect();
    buckets.sort_by_key(|bucket| bucket.date);

    debug!(
        "Grouped {} records into {} date buckets ({} undated)",
        records.len(),
        buckets.len(),
        undated
    );
    DateBuckets { buckets, undated }
}

/// One plan aggregation group
#[derive(Debug, Clone, Serialize)]
pub struct PlanBucket {
    /// Plan display name, or the "No Plan" sentinel
    pub plan_name: String,
    pub total: u32,
    /// Count per status label, deterministic iteration order
    pub status_counts: BTreeMap<&'static str, u32>,
    /// Revenue under the MRR rule: prices of active + trialing records
    pub revenue: f64,
}

/// Bucket subscriptions by plan name, sorted descending by revenue
///
/// Subscriptions without a plan land in the sentinel "No Plan" bucket. Ties
/// on revenue break by name so the ordering stays stable.
#[instrument(skip(records), fields(total = records.len()))]
pub fn plan_breakdown(records: &[Subscription]) -> Vec<PlanBucket> {
    let mut by_plan: HashMap<String, PlanBucket> = HashMap::new();

    for record in records {
        let name = record.plan_label().to_string();
        let bucket = by_plan.entry(name.clone()).or_insert_with(|| PlanBucket {
            plan_name: name,
            total: 0,
            status_counts: BTreeMap::new(),
            revenue: 0.0,
        });
        bucket.total += 1;
        *bucket.status_counts.entry(record.status.label()).or_insert(0) += 1;
        if record.status.is_revenue_generating() {
            bucket.revenue += record.plan_price();
        }
    }

    let mut buckets: Vec<PlanBucket> = by_plan.into_values().collect();
    buckets.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.plan_name.cmp(&b.plan_name))
    });

    debug!(
        "Grouped {} subscriptions into {} plan buckets",
        records.len(),
        buckets.len()
    );
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Plan, SubscriptionStatus, NO_PLAN_LABEL};

    fn sub(id: &str, status: SubscriptionStatus, plan: Option<(&str, f64)>, created: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            user: None,
            plan: plan.map(|(name, price)| Plan {
                id: Some(name.to_lowercase().replace(' ', "_")),
                name: Some(name.to_string()),
                price: Some(price),
            }),
            status,
            cancel_at_period_end: false,
            canceled_at: None,
            current_period_start: None,
            current_period_end: None,
            created_at: created.parse().ok(),
        }
    }

    #[test]
    fn test_date_buckets_ascending_with_per_status_counts() {
        let records = vec![
            sub("a", SubscriptionStatus::Active, None, "2024-01-02T10:00:00Z"),
            sub("b", SubscriptionStatus::Active, None, "2024-01-01T08:00:00Z"),
            sub("c", SubscriptionStatus::Canceled, None, "2024-01-01T22:00:00Z"),
        ];

        let grouped = group_by_date(&records);
        assert_eq!(grouped.buckets.len(), 2);
        assert_eq!(grouped.undated, 0);

        let first = &grouped.buckets[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.total, 2);
        assert_eq!(first.status_counts.get("active"), Some(&1));
        assert_eq!(first.status_counts.get("canceled"), Some(&1));

        let second = &grouped.buckets[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(second.total, 1);
    }

    #[test]
    fn test_bucket_conservation_with_undated_records() {
        let records = vec![
            sub("a", SubscriptionStatus::Active, None, "2024-01-01T10:00:00Z"),
            sub("b", SubscriptionStatus::Active, None, "not a date"),
            sub("c", SubscriptionStatus::Active, None, "2024-01-03T10:00:00Z"),
            sub("d", SubscriptionStatus::Active, None, ""),
        ];

        let grouped = group_by_date(&records);
        assert_eq!(grouped.undated, 2);
        assert_eq!(
            grouped.bucketed_total() + grouped.undated,
            records.len() as u32
        );
    }

    #[test]
    fn test_empty_input_yields_no_buckets() {
        let grouped = group_by_date::<Subscription>(&[]);
        assert!(grouped.buckets.is_empty());
        assert_eq!(grouped.undated, 0);
    }

    #[test]
    fn test_plan_breakdown_sorted_by_revenue() {
        let records = vec![
            sub("a", SubscriptionStatus::Active, Some(("Starter", 10.0)), "2024-01-01T10:00:00Z"),
            sub("b", SubscriptionStatus::Active, Some(("Growth", 50.0)), "2024-01-01T10:00:00Z"),
            sub("c", SubscriptionStatus::Active, Some(("Starter", 10.0)), "2024-01-02T10:00:00Z"),
            sub("d", SubscriptionStatus::Canceled, None, "2024-01-02T10:00:00Z"),
        ];

        let buckets = plan_breakdown(&records);
        assert_eq!(buckets.len(), 3);

        assert_eq!(buckets[0].plan_name, "Growth");
        assert_eq!(buckets[0].revenue, 50.0);
        assert_eq!(buckets[1].plan_name, "Starter");
        assert_eq!(buckets[1].total, 2);
        assert_eq!(buckets[1].revenue, 20.0);
        assert_eq!(buckets[2].plan_name, NO_PLAN_LABEL);
        assert_eq!(buckets[2].revenue, 0.0);
    }

    #[test]
    fn test_plan_revenue_follows_mrr_rule() {
        // Canceled records keep their plan but contribute no revenue.
        let records = vec![
            sub("a", SubscriptionStatus::Canceled, Some(("Starter", 10.0)), "2024-01-01T10:00:00Z"),
            sub("b", SubscriptionStatus::Trialing, Some(("Starter", 10.0)), "2024-01-01T10:00:00Z"),
        ];

        let buckets = plan_breakdown(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total, 2);
        assert_eq!(buckets[0].revenue, 10.0);
    }
}
