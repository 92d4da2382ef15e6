//! genedit gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http (axum, request id, timeout, body limit)
//!                │
//!                ├─ /api/edit-image ─────┐
//!                ├─ /api/generate-video ─┤
//!                │                       ▼
//!                │            backend::GenerationService
//!                │                       │
//!                │            resilience::RetryExecutor ──▶ generative backend
//!                │
//!                ├─ /api/generate-prompts ─▶ stages::PromptGenerator ──▶ completion model
//!                ├─ /api/time-travel ─────▶ prompts + per-stage fan-out
//!                ├─ /api/mask ────────────▶ drawing::DrawingSession (local)
//!                └─ /api/health ──────────▶ health::HealthChecker
//! ```

use std::path::PathBuf;

use clap::Parser;

use genedit::lifecycle;

#[derive(Parser)]
#[command(name = "genedit")]
#[command(about = "HTTP gateway for generative image editing", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "GENEDIT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (config, listener) = lifecycle::bootstrap(args.config.as_deref()).await?;
    lifecycle::run(config, listener).await?;

    Ok(())
}
