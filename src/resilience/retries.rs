//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failure is worth retrying (pluggable predicate)
//! - Execute attempts with a per-attempt deadline
//! - Sleep with exponential backoff + jitter between attempts
//! - Report every attempt and retry decision (tracing, metrics, observer)
//!
//! # Design Decisions
//! - Authentication and malformed-response failures never retry
//! - Network failures and timeouts retry until the budget is spent
//! - No state is shared between `execute` calls; executors are cheap to clone

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::error::{CallError, ErrorKind};
use crate::resilience::timeouts::run_with_deadline;

// Re-export RetryPolicy from config module to avoid duplication
pub use crate::config::schema::RetryPolicy;

/// Lower-cased message fragments that mark a failure as a transient
/// connectivity problem.
pub const RETRYABLE_PATTERNS: &[&str] = &[
    "connect timeout",
    "connection timeout",
    "request timeout",
    "network error",
    "fetch failed",
    "econnreset",
    "enotfound",
    "econnrefused",
    "connection refused",
    "connection reset",
    "dns error",
    "failed to lookup address",
    "socket hang up",
    "und_err_connect_timeout",
];

/// Default retryable predicate.
pub fn is_retryable(error: &CallError) -> bool {
    match error.kind() {
        ErrorKind::Authentication | ErrorKind::MalformedResponse => false,
        ErrorKind::Transient | ErrorKind::Network | ErrorKind::Timeout => true,
        ErrorKind::Other => {
            let message = error.message().to_lowercase();
            RETRYABLE_PATTERNS
                .iter()
                .any(|pattern| message.contains(pattern))
        }
    }
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed {
        kind: ErrorKind,
        message: String,
        retryable: bool,
    },
}

/// One iteration of the retry loop, as seen by an observer.
#[derive(Debug, Clone)]
pub struct CallAttempt {
    /// 0-indexed attempt number.
    pub attempt: u32,
    /// Time spent waiting on this attempt.
    pub elapsed: Duration,
    /// Backoff slept before the next attempt, if one follows.
    pub next_delay: Option<Duration>,
    pub outcome: AttemptOutcome,
}

pub type RetryPredicate = Arc<dyn Fn(&CallError) -> bool + Send + Sync>;
pub type AttemptObserver = Arc<dyn Fn(&CallAttempt) + Send + Sync>;

/// Wraps remote operations with timeout, retry and backoff.
#[derive(Clone)]
pub struct RetryExecutor {
    name: String,
    policy: RetryPolicy,
    predicate: RetryPredicate,
    observer: Option<AttemptObserver>,
}

impl RetryExecutor {
    /// Create an executor. `name` labels logs and metrics (e.g. "image_edit").
    pub fn new(name: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            predicate: Arc::new(is_retryable),
            observer: None,
        }
    }

    /// Replace the retryable predicate.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&CallError) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Receive a [`CallAttempt`] after every attempt.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Fn(&CallAttempt) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent.
    ///
    /// Each attempt is spawned and raced against `policy.timeout_ms`; a
    /// timed-out attempt is abandoned, not cancelled (see
    /// [`run_with_deadline`]).
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;
        let mut last_error = None;

        while attempt <= max_retries {
            let attempt_started = Instant::now();
            let result = run_with_deadline(operation(), self.policy.timeout()).await;
            let elapsed = attempt_started.elapsed();

            let error = match result {
                Ok(value) => {
                    self.observe(attempt, elapsed, None, AttemptOutcome::Succeeded);
                    metrics::record_attempt(&self.name, "success");
                    metrics::record_call(&self.name, "success", started.elapsed());
                    if attempt > 0 {
                        tracing::info!(call = %self.name, attempt = attempt + 1, "Backend call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            metrics::record_attempt(&self.name, error.kind().as_str());

            if attempt == max_retries {
                self.observe(attempt, elapsed, None, failed(&error, false));
                tracing::warn!(
                    call = %self.name,
                    attempts = attempt + 1,
                    error = %error,
                    "Backend call failed; retry budget exhausted"
                );
                metrics::record_call(&self.name, "failure", started.elapsed());
                return Err(error);
            }

            if !(self.predicate)(&error) {
                self.observe(attempt, elapsed, None, failed(&error, false));
                tracing::warn!(
                    call = %self.name,
                    attempt = attempt + 1,
                    kind = error.kind().as_str(),
                    error = %error,
                    "Backend call failed with non-retryable error"
                );
                metrics::record_call(&self.name, "failure", started.elapsed());
                return Err(error);
            }

            let delay = calculate_backoff(attempt, self.policy.base_delay_ms, self.policy.max_delay_ms);
            self.observe(attempt, elapsed, Some(delay), failed(&error, true));
            tracing::info!(
                call = %self.name,
                attempt = attempt + 1,
                max_attempts = max_retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying backend call"
            );
            metrics::record_retry(&self.name);

            last_error = Some(error);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }

        metrics::record_call(&self.name, "failure", started.elapsed());
        Err(last_error.unwrap_or_else(|| CallError::other("Retry loop exited without an attempt")))
    }

    fn observe(&self, attempt: u32, elapsed: Duration, next_delay: Option<Duration>, outcome: AttemptOutcome) {
        if let Some(observer) = &self.observer {
            observer(&CallAttempt {
                attempt,
                elapsed,
                next_delay,
                outcome,
            });
        }
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish()
    }
}

fn failed(error: &CallError, retryable: bool) -> AttemptOutcome {
    AttemptOutcome::Failed {
        kind: error.kind(),
        message: error.message().to_string(),
        retryable,
    }
}

/// Run `operation` under `policy` with the default predicate.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Result<T, CallError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CallError>> + Send + 'static,
    T: Send + 'static,
{
    RetryExecutor::new("call", policy.clone()).execute(operation).await
}
