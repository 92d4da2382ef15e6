//! Generative backend client.
//!
//! # Responsibilities
//! - Submit model inputs to `POST {base_url}/{model}`
//! - Translate HTTP status codes and transport errors into tagged
//!   [`CallError`]s the executor can reason about
//! - Decode model outputs
//!
//! One call here is one *attempt*; retries live in the executor.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::backend::credentials::Credentials;
use crate::backend::types::{EditImageInput, EditImageOutput, VideoInput, VideoOutput};
use crate::config::schema::BackendConfig;
use crate::resilience::{CallError, CallResult, ErrorKind};

/// Longest slice of an error body carried into a message.
const MAX_BODY_EXCERPT: usize = 200;

/// HTTP client for the generative backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    image_edit_model: String,
    video_model: String,
}

impl GenerativeClient {
    pub fn new(config: &BackendConfig, credentials: Credentials) -> CallResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("genedit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CallError::other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            image_edit_model: config.image_edit_model.clone(),
            video_model: config.video_model.clone(),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Run `model` once with `input`.
    pub async fn run_model<I, O>(&self, model: &str, input: &I) -> CallResult<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, model.trim_start_matches('/'));
        tracing::debug!(%url, "Submitting model request");

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .json(input)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        serde_json::from_str::<O>(&text)
            .map_err(|e| CallError::malformed(format!("Malformed response from {model}: {e}")))
    }

    pub async fn edit_image(&self, input: &EditImageInput) -> CallResult<EditImageOutput> {
        self.run_model(&self.image_edit_model, input).await
    }

    pub async fn generate_video(&self, input: &VideoInput) -> CallResult<VideoOutput> {
        self.run_model(&self.video_model, input).await
    }
}

/// Map a non-success status to a tagged failure.
pub fn classify_status(status: StatusCode, body: &str) -> CallError {
    let excerpt = excerpt(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CallError::authentication(format!("Unauthorized ({status}): {excerpt}"))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CallError::new(
            ErrorKind::Timeout,
            format!("upstream request timeout ({status}): {excerpt}"),
        ),
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => {
            CallError::transient(format!("Backend temporarily unavailable ({status}): {excerpt}"))
        }
        _ => CallError::other(format!("Backend returned {status}: {excerpt}")),
    }
}

/// Map a transport-level failure to a tagged failure.
pub fn classify_transport(error: reqwest::Error) -> CallError {
    if error.is_timeout() {
        CallError::new(ErrorKind::Timeout, format!("request timeout: {error}"))
    } else if error.is_connect() {
        CallError::network(format!("fetch failed: connection refused or unreachable: {error}"))
    } else if error.is_decode() {
        CallError::malformed(format!("Malformed response body: {error}"))
    } else if error.is_request() || error.is_body() {
        CallError::network(format!("fetch failed: {error}"))
    } else {
        CallError::other(error.to_string())
    }
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    if body.len() <= MAX_BODY_EXCERPT {
        return body;
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
