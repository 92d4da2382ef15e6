//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (FAL_KEY, OPENAI_API_KEY, GENEDIT_BIND_ADDRESS)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::BackendConfig;
pub use schema::CompletionConfig;
pub use schema::ListenerConfig;
pub use schema::RetryPolicy;
pub use validation::ValidationError;
