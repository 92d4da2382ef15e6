//! Metrics collection and exposition.
//!
//! # Metrics
//! - `genedit_call_attempts_total` (counter): attempts by call and outcome
//! - `genedit_retries_total` (counter): backoff sleeps by call
//! - `genedit_calls_total` (counter): finished calls by call and result
//! - `genedit_call_duration_seconds` (histogram): end-to-end call latency
//! - `genedit_requests_total` (counter): HTTP requests by route, status
//! - `genedit_request_duration_seconds` (histogram): HTTP latency
//! - `genedit_backend_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every macro is a no-op, so tests and the
//! CLI record freely.

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const CALL_ATTEMPTS_TOTAL: &str = "genedit_call_attempts_total";
pub const RETRIES_TOTAL: &str = "genedit_retries_total";
pub const CALLS_TOTAL: &str = "genedit_calls_total";
pub const CALL_DURATION_SECONDS: &str = "genedit_call_duration_seconds";
pub const REQUESTS_TOTAL: &str = "genedit_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "genedit_request_duration_seconds";
pub const BACKEND_HEALTH: &str = "genedit_backend_health";

static REGISTER_METRICS: Once = Once::new();

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            CALL_ATTEMPTS_TOTAL,
            Unit::Count,
            "Backend call attempts by outcome"
        );
        describe_counter!(RETRIES_TOTAL, Unit::Count, "Backoff sleeps before a retry");
        describe_counter!(CALLS_TOTAL, Unit::Count, "Finished backend calls by result");
        describe_histogram!(
            CALL_DURATION_SECONDS,
            Unit::Seconds,
            "Backend call latency including retries"
        );
        describe_counter!(REQUESTS_TOTAL, Unit::Count, "HTTP requests by route and status");
        describe_histogram!(
            REQUEST_DURATION_SECONDS,
            Unit::Seconds,
            "HTTP request latency"
        );
        describe_gauge!(BACKEND_HEALTH, "1 when the backend probe succeeded");
    });
}

/// One attempt finished. `outcome` is `success` or an error kind.
pub fn record_attempt(call: &str, outcome: &str) {
    counter!(CALL_ATTEMPTS_TOTAL, "call" => call.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

pub fn record_retry(call: &str) {
    counter!(RETRIES_TOTAL, "call" => call.to_string()).increment(1);
}

/// A call finished, after however many attempts it took.
pub fn record_call(call: &str, result: &'static str, elapsed: Duration) {
    counter!(CALLS_TOTAL, "call" => call.to_string(), "result" => result).increment(1);
    histogram!(CALL_DURATION_SECONDS, "call" => call.to_string()).record(elapsed.as_secs_f64());
}

pub fn record_request(route: &str, status: u16, elapsed: Duration) {
    counter!(REQUESTS_TOTAL, "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_backend_health(target: &str, healthy: bool) {
    gauge!(BACKEND_HEALTH, "target" => target.to_string()).set(if healthy { 1.0 } else { 0.0 });
}
