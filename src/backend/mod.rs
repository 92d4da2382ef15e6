//! Generative backend subsystem.
//!
//! # Data Flow
//! ```text
//! http handler
//!     → service.rs (validated request, per-call retry policy)
//!     → resilience::RetryExecutor (timeout, backoff)
//!     → client.rs / completion.rs (one HTTP attempt, tagged failure)
//!     → backend service
//! ```
//!
//! # Design Decisions
//! - Credentials are validated once, at construction
//! - Status codes and transport errors are tagged with an `ErrorKind` at the
//!   edge; nothing above inspects HTTP details

pub mod client;
pub mod completion;
pub mod credentials;
pub mod service;
pub mod types;

pub use client::GenerativeClient;
pub use completion::CompletionClient;
pub use credentials::{key_preview, Credentials};
pub use service::GenerationService;
pub use types::{EditMode, EditRequest, EditedImage, GeneratedVideo, VideoInput};
