//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, timeout, metrics)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::backend::GenerationService;
use crate::config::schema::{AppConfig, DrawingConfig};
use crate::health::HealthChecker;
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics;
use crate::stages::PromptGenerator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationService,
    pub prompts: PromptGenerator,
    pub health: Arc<HealthChecker>,
    pub drawing: DrawingConfig,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            generation: GenerationService::new(config),
            prompts: PromptGenerator::new(config),
            health: Arc::new(HealthChecker::new(config)),
            drawing: config.drawing.clone(),
        }
    }
}

/// HTTP facade for the generation gateway.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(&config);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/edit-image", post(handlers::edit_image))
            .route("/api/generate-video", post(handlers::generate_video))
            .route("/api/generate-prompts", post(handlers::generate_prompts))
            .route("/api/time-travel", post(handlers::time_travel))
            .route("/api/mask", post(handlers::mask))
            .route("/api/health", get(handlers::health))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!(route = %route, status = status.as_u16(), "Request failed");
    }
    metrics::record_request(&route, status.as_u16(), start_time.elapsed());
    response
}
