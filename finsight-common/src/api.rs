//! Platform API client with connection pooling and rate limiting
//!
//! This module provides a robust HTTP client for the finsight platform REST
//! API, including authentication, rate limiting, retry logic, and
//! comprehensive error handling.
//!
//! Every collection endpoint responds with the documented envelope
//! `{ "results": [...] }`. The envelope is the negotiated contract with the
//! backend; the client never infers response shapes at runtime.

use crate::error::{FinsightError, Result};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the platform API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the platform backend (e.g., "https://api.example.com")
    pub base_url: String,
    /// Bearer token for authentication
    pub api_token: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
    /// Maximum number of retry attempts (default: 3)
    pub max_retries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_token: String::new(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 10,
            max_retries: 3,
        }
    }
}

impl ApiConfig {
    /// Create a new configuration with the minimum required parameters
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the connection pool size
    pub fn with_pool_size(mut self, max_idle_per_host: usize) -> Self {
        self.max_idle_per_host = max_idle_per_host;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Response envelope for collection endpoints
///
/// The backend wraps every collection payload in this single documented
/// shape. Unknown extra fields are ignored by serde, and a missing
/// `results` key is a deserialization error surfaced to the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    /// The collection payload
    pub results: Vec<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope into its collection
    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

/// Platform API client with connection pooling and rate limiting
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl ApiClient {
    /// Create a new API client with the given configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        // Build the HTTP client with connection pooling and timeouts
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| FinsightError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| FinsightError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a new client with default configuration
    pub fn with_defaults(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let config = ApiConfig::new(base_url, api_token);
        Self::new(config)
    }

    /// Build a request URL for the given endpoint path
    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Make an authenticated request to the platform API with retry logic
    #[instrument(skip(self), fields(path = %path))]
    async fn make_request(&self, path: &str, params: &[(&str, &str)]) -> Result<Response> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let url = self.build_url(path);
        debug!("Making request to: {}", url);

        // Retry logic with exponential backoff
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let response = Retry::spawn(retry_strategy, || async {
            let request = self
                .client
                .get(&url)
                .bearer_auth(&self.config.api_token)
                .query(params);

            match request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        debug!("Request successful: {}", response.status());
                        Ok(response)
                    } else if response.status().is_client_error() {
                        // Don't retry client errors (4xx)
                        error!("Client error: {}", response.status());
                        Err(FinsightError::api_with_status(
                            format!("API returned client error: {}", response.status()),
                            response.status().as_u16(),
                        ))
                    } else {
                        // Retry server errors (5xx)
                        warn!("Server error, will retry: {}", response.status());
                        Err(FinsightError::api_with_status(
                            format!("API returned server error: {}", response.status()),
                            response.status().as_u16(),
                        ))
                    }
                }
                Err(e) if e.is_timeout() => {
                    warn!("Request timeout, will retry: {}", e);
                    Err(FinsightError::network_with_source("Request timeout", e))
                }
                Err(e) if e.is_connect() => {
                    warn!("Connection error, will retry: {}", e);
                    Err(FinsightError::network_with_source("Connection error", e))
                }
                Err(e) => {
                    error!("Request failed: {}", e);
                    Err(FinsightError::network_with_source("Request failed", e))
                }
            }
        })
        .await?;

        info!("Successfully completed request to {}", path);
        Ok(response)
    }

    /// Parse a JSON response into the specified type
    async fn parse_response<T>(&self, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let text = response
            .text()
            .await
            .map_err(|e| FinsightError::network_with_source("Failed to read response body", e))?;

        serde_json::from_str(&text).map_err(FinsightError::from)
    }

    /// Make a request and parse the JSON response
    #[instrument(skip(self), fields(path = %path))]
    pub async fn request_json<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.make_request(path, params).await?;
        self.parse_response(response).await
    }

    /// Fetch a collection endpoint and unwrap the documented envelope
    #[instrument(skip(self), fields(path = %path))]
    pub async fn fetch_results<T>(&self, path: &str) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let envelope: ApiEnvelope<T> = self.request_json(path, &[]).await?;
        Ok(envelope.into_results())
    }

    /// Test the connection to the platform backend
    ///
    /// Simple health check to verify the token and connection are working.
    /// Returns true if the connection is successful, false otherwise.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        info!("Testing connection to platform API");
        match self.make_request("health", &[]).await {
            Ok(_) => {
                info!("Connection test successful");
                true
            }
            Err(e) => {
                warn!("Connection test failed: {}", e);
                false
            }
        }
    }
}
