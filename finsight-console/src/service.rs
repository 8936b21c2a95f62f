//! Record fetching services over the shared API client
//!
//! Each service wraps one backend collection endpoint. Responses arrive in
//! the documented envelope (`{"results": [...]}`), so a service never
//! inspects the payload shape; it hands the envelope to serde and returns
//! the inner records.

use async_trait::async_trait;
use finsight_common::{ApiClient, Result};
use finsight_reports::{RegistrationLog, Subscription};
use tracing::{debug, instrument};

/// A source of records for one collection
///
/// The store refreshes through this trait, so tests can swap the HTTP-backed
/// services for in-memory fakes.
#[async_trait]
pub trait RecordSource<T>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<T>>;
}

/// Fetches the subscription collection
pub struct SubscriptionService {
    client: ApiClient,
}

impl SubscriptionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource<Subscription> for SubscriptionService {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<Subscription>> {
        let records: Vec<Subscription> = self.client.fetch_results("api/subscriptions").await?;
        debug!("Fetched {} subscriptions", records.len());
        Ok(records)
    }
}

/// Fetches the registration log collection
pub struct RegistrationLogService {
    client: ApiClient,
}

impl RegistrationLogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource<RegistrationLog> for RegistrationLogService {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<RegistrationLog>> {
        let records: Vec<RegistrationLog> =
            self.client.fetch_results("api/registration-logs").await?;
        debug!("Fetched {} registration logs", records.len());
        Ok(records)
    }
}
