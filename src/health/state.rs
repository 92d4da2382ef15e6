//! Health report model.
//!
//! # States
//! - Healthy: credentials configured and backend reachable (200)
//! - Degraded: credentials configured, backend unreachable (206)
//! - Unhealthy: credentials missing (503)

use serde::Serialize;

/// Response time above which the network is reported as slow.
pub const SLOW_RESPONSE_MS: u64 = 5000;

pub const ALL_OPERATIONAL: &str = "All systems operational!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn evaluate(configured: bool, accessible: bool) -> Self {
        match (configured, accessible) {
            (true, true) => HealthStatus::Healthy,
            (true, false) => HealthStatus::Degraded,
            (false, _) => HealthStatus::Unhealthy,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Degraded => 206,
            HealthStatus::Unhealthy => 503,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub key_preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub accessible: bool,
    pub response_time: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStatus {
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the process started.
    pub uptime: f64,
    /// Unix seconds.
    pub timestamp: u64,
    pub completion_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub basic: BasicStatus,
    pub api_key: ApiKeyStatus,
    pub network: NetworkStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Milliseconds spent producing the report.
    pub response_time: u64,
    pub checks: HealthChecks,
    pub recommendations: Vec<String>,
}

/// Operator advice for the observed state.
pub fn recommendations(api_key: &ApiKeyStatus, network: &NetworkStatus) -> Vec<String> {
    let mut out = Vec::new();

    if !api_key.configured {
        out.push(
            "Configure your FAL_KEY environment variable. Get your API key from https://fal.ai"
                .to_string(),
        );
    }

    if !network.accessible {
        let error = network.error.as_deref().unwrap_or_default();
        let advice = if error.contains("timeout") {
            "Network connection to fal.ai is slow. Check your internet connection or try again later."
        } else if error.contains("blocked") || error.contains("refused") {
            "Connection to fal.ai is blocked. Check firewall settings or corporate network policies."
        } else {
            "Cannot reach fal.ai servers. Check your internet connection and DNS settings."
        };
        out.push(advice.to_string());
    }

    if network.response_time.is_some_and(|ms| ms > SLOW_RESPONSE_MS) {
        out.push(
            "Slow network connection detected. Consider checking your internet speed or trying again later."
                .to_string(),
        );
    }

    if out.is_empty() {
        out.push(ALL_OPERATIONAL.to_string());
    }
    out
}
