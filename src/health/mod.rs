//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/health
//!     → active.rs (credential check + one probe of the backend health URL)
//!     → state.rs (status, recommendations)
//!     → report (200 / 206 / 503)
//! ```
//!
//! # Design Decisions
//! - Probes run per request; there is no background monitor
//! - Missing credentials make the service unhealthy, not unstartable

pub mod active;
pub mod state;

pub use active::HealthChecker;
pub use state::{HealthReport, HealthStatus};
