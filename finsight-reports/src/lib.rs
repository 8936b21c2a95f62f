//! Filtering and aggregation engine for finsight console reports
//!
//! A pure, stateless transformation pipeline with four stages, each re-run
//! whenever its inputs change:
//!
//! 1. Record store (owned by the caller) holds the raw fetched collection.
//! 2. Filter stage applies a conjunction of independent predicates.
//! 3. Aggregation stage computes summary statistics and groupings.
//! 4. Presentation stage maps everything into renderable report sections.
//!
//! Data flows one way; every stage is recomputed from scratch on change.

pub mod buckets;
pub mod filter;
pub mod format;
pub mod records;
pub mod report;
pub mod stats;

pub use buckets::{group_by_date, plan_breakdown, DateBucket, DateBuckets, DatedRecord, PlanBucket};
pub use filter::{
    apply_registration_filters, apply_subscription_filters, DatePreset, DateRangeFilter,
    RegistrationFilter, Selection, SubscriptionFilter,
};
pub use format::{currency_symbol, format_currency, format_date};
pub use records::{
    CancellationState, Plan, RegistrantDetails, RegistrationLog, RegistrationStatus, Subscription,
    SubscriptionStatus, UserInfo, NO_PLAN_LABEL,
};
pub use report::{
    build_registration_report, build_subscription_report, registration_report_pipeline,
    subscription_report_pipeline, DetailSection, RegistrationReport, ReportConfig,
    RetentionSection, SubscriptionReport, DETAIL_ROW_LIMIT,
};
pub use stats::{rate, RegistrationStats, SubscriptionStats};
