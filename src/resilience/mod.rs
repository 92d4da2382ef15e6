//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Backend call (image edit, video, prompt completion):
//!     → retries.rs (attempt loop, retryable predicate, observer)
//!     → timeouts.rs (spawn attempt, race against policy deadline)
//!     → On retryable failure: backoff.rs (exponential delay + jitter)
//!     → Final value or CallError (error.rs) back to the caller
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline; a missed deadline abandons the
//!   attempt without cancelling the remote job
//! - Only transient failures are retried; credentials errors fail fast
//! - Policies are immutable values chosen per call site

pub mod backoff;
pub mod error;
pub mod retries;
pub mod timeouts;

pub use error::{CallError, CallResult, ErrorKind, FailureClass};
pub use retries::{is_retryable, with_retry, AttemptOutcome, CallAttempt, RetryExecutor, RetryPolicy};
