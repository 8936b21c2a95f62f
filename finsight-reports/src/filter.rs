//! Filter stage: conjunction of independent predicates over a record collection
//!
//! All predicates compose by logical AND and are pure functions of the record
//! and the criteria, so application order never changes the result. Missing
//! fields on a record fail to match instead of erroring.

use crate::records::{CancellationState, RegistrationLog, RegistrationStatus, Subscription, SubscriptionStatus};
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use tracing::{debug, instrument};

/// Named presets computed relative to the current instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    Today,
    Last7Days,
    Last30Days,
    Last3Months,
    LastYear,
}

impl DatePreset {
    /// Lower bound applied as `created_at >= threshold`
    pub fn threshold(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or(now),
            Self::Last7Days => now - Duration::days(7),
            Self::Last30Days => now - Duration::days(30),
            Self::Last3Months => now.checked_sub_months(Months::new(3)).unwrap_or(now),
            Self::LastYear => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        }
    }
}

/// Date-range membership predicate
///
/// Two independent selection modes exist: a named preset, or an explicit
/// calendar-day boundary. Entering explicit dates supersedes a preset, which
/// this enum models by making the two states mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DateRangeFilter {
    /// No date constraint
    #[default]
    All,
    /// Named preset relative to now
    Preset(DatePreset),
    /// Explicit inclusive boundary; `to` covers the full day (23:59:59.999)
    Custom {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateRangeFilter {
    /// Whether a record with the given creation time falls inside the range
    ///
    /// With no constraint every record matches, including undated ones. Once
    /// any bound is set, a record without a parseable `created_at` fails to
    /// match. An inverted explicit range yields no matches rather than an
    /// error.
    pub fn matches(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Preset(preset) => match created_at {
                Some(ts) => ts >= preset.threshold(now),
                None => false,
            },
            Self::Custom { from: None, to: None } => true,
            Self::Custom { from, to } => {
                let ts = match created_at {
                    Some(ts) => ts,
                    None => return false,
                };
                if let Some(from) = from {
                    let start = from.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
                    if start.map_or(false, |start| ts < start) {
                        return false;
                    }
                }
                if let Some(to) = to {
                    // Inclusive end-of-day boundary, so same-day ranges cover
                    // the full day.
                    let end = to.and_hms_milli_opt(23, 59, 59, 999).map(|dt| dt.and_utc());
                    if end.map_or(false, |end| ts > end) {
                        return false;
                    }
                }
                true
            }
        }
    }
}

/// Equality predicate with an explicit no-op state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    /// Match everything
    All,
    /// Match records whose value equals the selected one
    Only(T),
}

// Manual impl: the derive would demand `T: Default` for a variant that
// carries no `T`.
impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == value,
        }
    }
}

/// Filter criteria for subscription records
///
/// Created fresh per interaction and immutable once applied; `Default` is
/// the match-everything criteria.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    /// Case-insensitive substring matched against user email, display name,
    /// plan name, and subscription id; empty matches everything
    pub search_term: String,
    pub status: Selection<SubscriptionStatus>,
    /// Equality on plan id
    pub plan: Selection<String>,
    pub cancellation: Selection<CancellationState>,
    pub date_range: DateRangeFilter,
}

/// Filter criteria for registration log entries
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    /// Case-insensitive substring matched against registrant email, IP
    /// address, and user agent; empty matches everything
    pub search_term: String,
    pub status: Selection<RegistrationStatus>,
    pub date_range: DateRangeFilter,
}

fn contains_ci(field: Option<&str>, needle: &str) -> bool {
    field.map_or(false, |value| value.to_lowercase().contains(needle))
}

fn subscription_matches_search(record: &Subscription, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let user = record.user.as_ref();
    let plan = record.plan.as_ref();

    contains_ci(user.and_then(|u| u.email.as_deref()), needle)
        || contains_ci(user.and_then(|u| u.display_name.as_deref()), needle)
        || contains_ci(plan.and_then(|p| p.name.as_deref()), needle)
        || contains_ci(Some(record.id.as_str()), needle)
}

fn registration_matches_search(record: &RegistrationLog, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    contains_ci(
        record.user_details.as_ref().and_then(|d| d.email.as_deref()),
        needle,
    ) || contains_ci(record.ip_address.as_deref(), needle)
        || contains_ci(record.user_agent.as_deref(), needle)
}

/// Apply the full conjunction of subscription predicates
///
/// Pure function of its inputs; the result preserves the input order.
#[instrument(skip(records, criteria), fields(total = records.len()))]
pub fn apply_subscription_filters(
    records: &[Subscription],
    criteria: &SubscriptionFilter,
    now: DateTime<Utc>,
) -> Vec<Subscription> {
    let needle = criteria.search_term.trim().to_lowercase();

    let filtered: Vec<Subscription> = records
        .iter()
        .filter(|record| subscription_matches_search(record, &needle))
        .filter(|record| criteria.status.matches(&record.status))
        .filter(|record| match &criteria.plan {
            Selection::All => true,
            Selection::Only(plan_id) => record
                .plan
                .as_ref()
                .and_then(|plan| plan.id.as_deref())
                .map_or(false, |id| id == plan_id),
        })
        .filter(|record| criteria.cancellation.matches(&record.cancellation_state()))
        .filter(|record| criteria.date_range.matches(record.created_at, now))
        .cloned()
        .collect();

    debug!(
        "Filtered {} of {} subscription records",
        filtered.len(),
        records.len()
    );
    filtered
}

/// Apply the full conjunction of registration-log predicates
#[instrument(skip(records, criteria), fields(total = records.len()))]
pub fn apply_registration_filters(
    records: &[RegistrationLog],
    criteria: &RegistrationFilter,
    now: DateTime<Utc>,
) -> Vec<RegistrationLog> {
    let needle = criteria.search_term.trim().to_lowercase();

    let filtered: Vec<RegistrationLog> = records
        .iter()
        .filter(|record| registration_matches_search(record, &needle))
        .filter(|record| criteria.status.matches(&record.status))
        .filter(|record| criteria.date_range.matches(record.created_at, now))
        .cloned()
        .collect();

    debug!(
        "Filtered {} of {} registration records",
        filtered.len(),
        records.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Plan, UserInfo};
    use chrono::TimeZone;

    fn sub(id: &str, email: &str, status: SubscriptionStatus, created: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            user: Some(UserInfo {
                email: Some(email.to_string()),
                display_name: Some(format!("User {}", id)),
            }),
            plan: Some(Plan {
                id: Some("plan_basic".to_string()),
                name: Some("Basic".to_string()),
                price: Some(10.0),
            }),
            status,
            cancel_at_period_end: false,
            canceled_at: None,
            current_period_start: None,
            current_period_end: None,
            created_at: created.parse().ok(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let records = vec![
            sub("sub_1", "a@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
            sub("sub_2", "b@x.com", SubscriptionStatus::Canceled, "bogus"),
        ];
        let filtered =
            apply_subscription_filters(&records, &SubscriptionFilter::default(), now());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = vec![
            sub("sub_1", "jane@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
            sub("sub_2", "bob@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
            sub("sub_3", "carol@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
            sub("sub_4", "dave@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
            sub("sub_5", "erin@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
        ];

        for term in ["jane", "JANE", "Jane"] {
            let criteria = SubscriptionFilter {
                search_term: term.to_string(),
                ..Default::default()
            };
            let filtered = apply_subscription_filters(&records, &criteria, now());
            assert_eq!(filtered.len(), 1, "term {:?}", term);
            assert_eq!(filtered[0].id, "sub_1");
        }
    }

    #[test]
    fn test_search_tolerates_missing_fields() {
        let mut record = sub("sub_1", "a@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z");
        record.user = None;
        record.plan = None;

        let criteria = SubscriptionFilter {
            search_term: "jane".to_string(),
            ..Default::default()
        };
        let filtered = apply_subscription_filters(&[record], &criteria, now());
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_status_filter_exact_equality() {
        let records = vec![
            sub("sub_1", "a@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z"),
            sub("sub_2", "b@x.com", SubscriptionStatus::Canceled, "2024-01-01T10:00:00Z"),
        ];
        let criteria = SubscriptionFilter {
            status: Selection::Only(SubscriptionStatus::Canceled),
            ..Default::default()
        };
        let filtered = apply_subscription_filters(&records, &criteria, now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "sub_2");
    }

    #[test]
    fn test_cancellation_filter_selects_exclusive_state() {
        let renewing = sub("sub_1", "a@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z");
        let mut pending = sub("sub_2", "b@x.com", SubscriptionStatus::Active, "2024-01-01T10:00:00Z");
        pending.cancel_at_period_end = true;
        let mut canceled = sub("sub_3", "c@x.com", SubscriptionStatus::Canceled, "2024-01-01T10:00:00Z");
        canceled.canceled_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        let records = vec![renewing, pending, canceled];

        for (state, expected) in [
            (CancellationState::Renewing, "sub_1"),
            (CancellationState::PendingCancellation, "sub_2"),
            (CancellationState::Canceled, "sub_3"),
        ] {
            let criteria = SubscriptionFilter {
                cancellation: Selection::Only(state),
                ..Default::default()
            };
            let filtered = apply_subscription_filters(&records, &criteria, now());
            assert_eq!(filtered.len(), 1);
            assert_eq!(filtered[0].id, expected);
        }
    }

    #[test]
    fn test_explicit_range_end_of_day_inclusive() {
        let records = vec![
            sub("sub_in", "a@x.com", SubscriptionStatus::Active, "2024-01-01T23:59:00Z"),
            sub("sub_out", "b@x.com", SubscriptionStatus::Active, "2024-01-02T00:00:01Z"),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let criteria = SubscriptionFilter {
            date_range: DateRangeFilter::Custom {
                from: Some(day),
                to: Some(day),
            },
            ..Default::default()
        };
        let filtered = apply_subscription_filters(&records, &criteria, now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "sub_in");
    }

    #[test]
    fn test_inverted_range_yields_empty_set() {
        let records = vec![sub(
            "sub_1",
            "a@x.com",
            SubscriptionStatus::Active,
            "2024-01-15T10:00:00Z",
        )];
        let criteria = SubscriptionFilter {
            date_range: DateRangeFilter::Custom {
                from: NaiveDate::from_ymd_opt(2024, 2, 1),
                to: NaiveDate::from_ymd_opt(2024, 1, 1),
            },
            ..Default::default()
        };
        let filtered = apply_subscription_filters(&records, &criteria, now());
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_date_constraint_excludes_undated_records() {
        let records = vec![
            sub("sub_dated", "a@x.com", SubscriptionStatus::Active, "2024-06-10T10:00:00Z"),
            sub("sub_undated", "b@x.com", SubscriptionStatus::Active, "bogus"),
        ];
        let criteria = SubscriptionFilter {
            date_range: DateRangeFilter::Preset(DatePreset::Last30Days),
            ..Default::default()
        };
        let filtered = apply_subscription_filters(&records, &criteria, now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "sub_dated");
    }

    #[test]
    fn test_preset_thresholds() {
        let now = now();

        assert_eq!(
            DatePreset::Today.threshold(now),
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            DatePreset::Last7Days.threshold(now),
            Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap()
        );
        assert_eq!(
            DatePreset::Last3Months.threshold(now),
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            DatePreset::LastYear.threshold(now),
            Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_filter_idempotence() {
        let records = vec![
            sub("sub_1", "jane@x.com", SubscriptionStatus::Active, "2024-06-01T10:00:00Z"),
            sub("sub_2", "bob@x.com", SubscriptionStatus::Canceled, "2024-05-01T10:00:00Z"),
            sub("sub_3", "janet@x.com", SubscriptionStatus::Active, "2023-01-01T10:00:00Z"),
        ];
        let criteria = SubscriptionFilter {
            search_term: "jan".to_string(),
            status: Selection::Only(SubscriptionStatus::Active),
            date_range: DateRangeFilter::Preset(DatePreset::LastYear),
            ..Default::default()
        };

        let once = apply_subscription_filters(&records, &criteria, now());
        let twice = apply_subscription_filters(&once, &criteria, now());
        assert_eq!(once.len(), twice.len());
        assert_eq!(
            once.iter().map(|r| &r.id).collect::<Vec<_>>(),
            twice.iter().map(|r| &r.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_filter_monotonicity() {
        let records: Vec<Subscription> = (0..20)
            .map(|i| {
                sub(
                    &format!("sub_{}", i),
                    &format!("user{}@x.com", i),
                    if i % 3 == 0 {
                        SubscriptionStatus::Active
                    } else {
                        SubscriptionStatus::Canceled
                    },
                    &format!("2024-0{}-01T10:00:00Z", (i % 6) + 1),
                )
            })
            .collect();

        let loose = SubscriptionFilter {
            search_term: "user".to_string(),
            ..Default::default()
        };
        let tight = SubscriptionFilter {
            status: Selection::Only(SubscriptionStatus::Active),
            ..loose.clone()
        };
        let tighter = SubscriptionFilter {
            date_range: DateRangeFilter::Preset(DatePreset::Last3Months),
            ..tight.clone()
        };

        let a = apply_subscription_filters(&records, &loose, now()).len();
        let b = apply_subscription_filters(&records, &tight, now()).len();
        let c = apply_subscription_filters(&records, &tighter, now()).len();
        assert!(a >= b);
        assert!(b >= c);
    }

    #[test]
    fn test_registration_search_over_ip_and_agent() {
        let records = vec![
            RegistrationLog {
                id: "log_1".to_string(),
                user_details: Some(crate::records::RegistrantDetails {
                    email: Some("jane@x.com".to_string()),
                }),
                ip_address: Some("10.0.0.1".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
                status: RegistrationStatus::Completed,
                created_at: "2024-06-01T10:00:00Z".parse().ok(),
            },
            RegistrationLog {
                id: "log_2".to_string(),
                user_details: None,
                ip_address: Some("192.168.1.5".to_string()),
                user_agent: None,
                status: RegistrationStatus::Failed,
                created_at: "2024-06-02T10:00:00Z".parse().ok(),
            },
        ];

        let by_ip = RegistrationFilter {
            search_term: "192.168".to_string(),
            ..Default::default()
        };
        let filtered = apply_registration_filters(&records, &by_ip, now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "log_2");

        let by_agent = RegistrationFilter {
            search_term: "mozilla".to_string(),
            ..Default::default()
        };
        let filtered = apply_registration_filters(&records, &by_agent, now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "log_1");
    }
}
