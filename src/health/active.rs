//! Active health checking.
//!
//! # Responsibilities
//! - Probe the generative backend on demand
//! - Combine the probe with credential status into a report

use reqwest::Client;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

use crate::backend::credentials::{key_preview, Credentials};
use crate::config::schema::AppConfig;
use crate::health::state::{
    recommendations, ApiKeyStatus, BasicStatus, HealthChecks, HealthReport, HealthStatus,
    NetworkStatus,
};
use crate::observability::metrics;

const USER_AGENT: &str = "genedit-health-check";

pub struct HealthChecker {
    client: Client,
    url: String,
    timeout: Duration,
    api_key: Option<String>,
    completion_configured: bool,
    started: Instant,
}

impl HealthChecker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.backend.health_url.clone(),
            timeout: Duration::from_secs(config.backend.health_timeout_secs),
            api_key: config.backend.api_key.clone(),
            completion_configured: config.completion.api_key.is_some(),
            started: Instant::now(),
        }
    }

    pub fn api_key_status(&self) -> ApiKeyStatus {
        ApiKeyStatus {
            configured: Credentials::from_option(self.api_key.as_deref()).is_ok(),
            key_preview: key_preview(self.api_key.as_deref()),
        }
    }

    /// GET the health URL once.
    pub async fn probe(&self) -> NetworkStatus {
        let probe_started = Instant::now();
        let result = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await;

        let status = match result {
            Ok(response) => {
                let status = response.status();
                NetworkStatus {
                    accessible: status.is_success(),
                    response_time: Some(probe_started.elapsed().as_millis() as u64),
                    error: (!status.is_success()).then(|| format!("HTTP {status}")),
                }
            }
            Err(e) => {
                let error = if e.is_timeout() {
                    format!("request timeout after {}s", self.timeout.as_secs())
                } else if e.is_connect() {
                    format!("connection refused: {e}")
                } else {
                    e.to_string()
                };
                tracing::warn!(url = %self.url, error = %error, "Health probe failed");
                NetworkStatus {
                    accessible: false,
                    response_time: None,
                    error: Some(error),
                }
            }
        };

        metrics::record_backend_health("generative_backend", status.accessible);
        status
    }

    pub async fn report(&self) -> HealthReport {
        let started = Instant::now();
        let api_key = self.api_key_status();
        let network = self.probe().await;
        let status = HealthStatus::evaluate(api_key.configured, network.accessible);
        let recommendations = recommendations(&api_key, &network);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        HealthReport {
            status,
            response_time: started.elapsed().as_millis() as u64,
            checks: HealthChecks {
                basic: BasicStatus {
                    status: "ok",
                    version: env!("CARGO_PKG_VERSION"),
                    uptime: self.started.elapsed().as_secs_f64(),
                    timestamp,
                    completion_configured: self.completion_configured,
                },
                api_key,
                network,
            },
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_and_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = AppConfig::default();
        config.backend.health_url = format!("http://{addr}/health");
        let checker = HealthChecker::new(&config);

        let report = checker.report().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.checks.api_key.key_preview, "not-set");
        assert!(!report.checks.network.accessible);
        assert!(report.checks.network.error.as_deref().unwrap().contains("refused"));
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn test_placeholder_key_is_not_configured() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("your_fal_api_key_here".into());
        let status = HealthChecker::new(&config).api_key_status();
        assert!(!status.configured);
        assert_eq!(status.key_preview, "your_fal...");
    }
}
