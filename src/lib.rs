//! Generative image-editing gateway.
//!
//! Wraps a hosted image-editing and image-to-video backend behind a small
//! HTTP API with retries and deadlines, adds multi-stage "time travel"
//! generation on top of it, and renders edit masks from pointer strokes.

// Outbound calls
pub mod backend;
pub mod resilience;
pub mod stages;

// Local processing
pub mod drawing;

// Facade
pub mod config;
pub mod health;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
