//! Finsight Console - Main Entry Point

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use finsight_common::{logging::LoggingConfig, ApiClient, ApiConfig};
use finsight_config::{Config, ConfigLoader};
use finsight_console::{
    CurrentUser, CurrentUserProvider, RecordStore, RefreshScheduler, RegistrationLogService,
    StaticUserProvider, SubscriptionService,
};
use finsight_reports::{
    apply_registration_filters, apply_subscription_filters, build_registration_report,
    build_subscription_report, format_currency, RegistrationFilter, ReportConfig,
    SubscriptionFilter,
};

fn report_config(config: &Config) -> ReportConfig {
    ReportConfig {
        title: config.report.title.clone(),
        subtitle: config.report.subtitle.clone(),
        ..Default::default()
    }
}

fn api_client(config: &Config) -> Result<ApiClient> {
    let api_config = ApiConfig::new(&config.api.base_url, &config.api.api_token)
        .with_timeout(config.api.timeout_seconds)
        .with_max_retries(config.api.max_retries as usize)
        .with_rate_limit(config.api.rate_limit_per_sec);
    ApiClient::new(api_config).context("failed to build API client")
}

async fn run(config: Config) -> Result<()> {
    let client = api_client(&config)?;
    if !client.test_connection().await {
        warn!("Platform API health check failed; starting with empty stores");
    }
    let subscriptions = Arc::new(SubscriptionService::new(client.clone()));
    let registrations = Arc::new(RegistrationLogService::new(client));

    let subscription_store = Arc::new(RecordStore::new());
    let registration_store = Arc::new(RecordStore::new());

    // Initial load. A failure here leaves the store empty and is reported,
    // but the console stays up so the periodic refresh can recover.
    if let Err(err) = subscription_store.refresh(subscriptions.as_ref()).await {
        error!("Initial subscription load failed: {}", err);
    }
    if let Err(err) = registration_store.refresh(registrations.as_ref()).await {
        error!("Initial registration log load failed: {}", err);
    }

    let operator = StaticUserProvider::new(CurrentUser {
        id: "console".to_string(),
        email: "console@finsight.local".to_string(),
        display_name: Some("Finsight Console".to_string()),
    });

    let now = chrono::Utc::now();
    let presentation = report_config(&config);

    let subscription_records = subscription_store.records().await;
    let filtered =
        apply_subscription_filters(&subscription_records, &SubscriptionFilter::default(), now);
    let subscription_report = build_subscription_report(&filtered, &presentation, now);
    if let Some(summary) = &subscription_report.summary {
        info!(
            "Current MRR: {} across {} healthy subscriptions",
            format_currency(summary.total_mrr, &config.report.currency),
            summary.healthy
        );
    }

    let registration_records = registration_store.records().await;
    let filtered =
        apply_registration_filters(&registration_records, &RegistrationFilter::default(), now);
    let registration_report = build_registration_report(&filtered, &presentation, now);

    if let Some(user) = operator.current_user() {
        info!("Reports prepared by {}", user.preferred_name());
    }
    println!("{}", serde_json::to_string_pretty(&subscription_report)?);
    println!("{}", serde_json::to_string_pretty(&registration_report)?);

    if !config.refresh.enabled {
        return Ok(());
    }

    // Keep the stores fresh until interrupted.
    let interval = Duration::from_secs(config.refresh.interval_seconds);
    let mut subscription_refresh = RefreshScheduler::new();
    let mut registration_refresh = RefreshScheduler::new();
    subscription_refresh
        .start("subscriptions", Arc::clone(&subscription_store), subscriptions, interval)
        .await;
    registration_refresh
        .start("registration-logs", Arc::clone(&registration_store), registrations, interval)
        .await;

    info!("Periodic refresh running every {}s, press Ctrl+C to stop", interval.as_secs());
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Shutting down");
    subscription_refresh.stop().await;
    registration_refresh.stop().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;

    finsight_common::init_logging(LoggingConfig {
        level: config.logging.level.clone(),
        pretty_format: config.logging.colored,
        file_path: config.logging.file.clone(),
        ..Default::default()
    })
    .map_err(|err| anyhow::anyhow!("failed to initialize logging: {}", err))?;

    info!("Finsight console starting");
    run(config).await
}
