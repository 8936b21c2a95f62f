//! Record models for the report engine
//!
//! Records are immutable snapshots fetched from the platform backend. Wire
//! payloads are not trusted: every nested object and timestamp is optional,
//! and unrecognized status strings deserialize to `Unknown` instead of
//! failing the whole collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Unpaid,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Trialing,
    /// Fallback display category for unrecognized wire values
    #[default]
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// Stable label used for bucket keys and display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Unpaid => "unpaid",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Trialing => "trialing",
            Self::Unknown => "unknown",
        }
    }

    /// Statuses that count toward monthly recurring revenue
    pub fn is_revenue_generating(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Outcome status of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Completed,
    Failed,
    /// Fallback display category for unrecognized wire values
    #[default]
    #[serde(other)]
    Unknown,
}

impl RegistrationStatus {
    /// Stable label used for bucket keys and display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Subscribing user, as embedded in a subscription record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Subscription plan, as embedded in a subscription record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Monthly price; missing prices contribute zero to revenue sums
    pub price: Option<f64>,
}

/// One subscription record fetched from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user: Option<UserInfo>,
    pub plan: Option<Plan>,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<DateTime<Utc>>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Mutually exclusive cancellation states of a subscription
///
/// Exactly one state holds per record: a pending cancellation flag takes
/// precedence, then a recorded cancellation timestamp, otherwise the
/// subscription is renewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationState {
    /// `cancel_at_period_end` is set; the subscription lapses at period end
    PendingCancellation,
    /// `canceled_at` is recorded; the subscription has been canceled
    Canceled,
    /// Neither flag set; the subscription renews normally
    Renewing,
}

impl Subscription {
    /// Classify this record into its cancellation state
    pub fn cancellation_state(&self) -> CancellationState {
        if self.cancel_at_period_end {
            CancellationState::PendingCancellation
        } else if self.canceled_at.is_some() {
            CancellationState::Canceled
        } else {
            CancellationState::Renewing
        }
    }

    /// Plan price, or zero when the plan or its price is missing
    pub fn plan_price(&self) -> f64 {
        self.plan
            .as_ref()
            .and_then(|plan| plan.price)
            .unwrap_or(0.0)
    }

    /// Plan display name, or the sentinel bucket label when absent
    pub fn plan_label(&self) -> &str {
        self.plan
            .as_ref()
            .and_then(|plan| plan.name.as_deref())
            .unwrap_or(NO_PLAN_LABEL)
    }
}

/// Sentinel bucket label for subscriptions without a plan
pub const NO_PLAN_LABEL: &str = "No Plan";

/// Registrant details, as embedded in a registration log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrantDetails {
    pub email: Option<String>,
}

/// One registration log entry fetched from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationLog {
    pub id: String,
    pub user_details: Option<RegistrantDetails>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub status: RegistrationStatus,
    pub created_at: Option<DateTime<Utc>>,
}
