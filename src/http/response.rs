//! Error responses.
//!
//! # Responsibilities
//! - Map executor failures to HTTP status codes and setup/retry hints
//! - Keep backend error details out of client-facing messages
//!
//! # Status Mapping
//! - Authentication → 401 + `needsSetup`
//! - Network → 503 + `isNetworkError`
//! - Timeout → 408 + `isTimeoutError`
//! - Everything else → 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::backend::credentials::MISSING_KEY_MESSAGE;
use crate::resilience::{CallError, FailureClass};

pub const INVALID_KEY_MESSAGE: &str = "Invalid FAL API key. Please check your API key at https://fal.ai";

/// Route-specific wording for failures.
#[derive(Debug, Clone, Copy)]
pub struct FailureMessages {
    pub network: &'static str,
    pub timeout: &'static str,
    pub generic: &'static str,
    /// Backend answered but produced nothing; surfaced verbatim.
    pub empty: &'static str,
}

pub const EDIT_IMAGE_MESSAGES: FailureMessages = FailureMessages {
    network: "Connection to fal.ai failed. Please check your internet connection and try again. If the problem persists, it might be a temporary service issue.",
    timeout: "Image processing timed out. The service might be experiencing high demand. Please try again in a few minutes.",
    generic: "Failed to process image. Please try again later.",
    empty: crate::backend::service::NO_IMAGES_MESSAGE,
};

pub const VIDEO_MESSAGES: FailureMessages = FailureMessages {
    network: "Connection to fal.ai failed during video generation. Please check your internet connection and try again. If the problem persists, it might be a temporary service issue.",
    timeout: "Video generation timed out. This can happen during high demand or with complex scenes. Please try with a simpler prompt or try again later.",
    generic: "Failed to generate video. Please try again later.",
    empty: crate::backend::service::NO_VIDEO_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_setup: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_network_error: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_timeout_error: bool,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                needs_setup: false,
                is_network_error: false,
                is_timeout_error: false,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Translate a final executor failure.
    pub fn from_call(error: &CallError, messages: &FailureMessages) -> Self {
        match error.class() {
            FailureClass::Authentication => {
                // A missing key keeps its setup instructions; a rejected
                // one gets the "invalid key" wording.
                let message = if error.message() == MISSING_KEY_MESSAGE {
                    MISSING_KEY_MESSAGE
                } else {
                    INVALID_KEY_MESSAGE
                };
                let mut api = Self::new(StatusCode::UNAUTHORIZED, message);
                api.body.needs_setup = true;
                api
            }
            FailureClass::Network => {
                let mut api = Self::new(StatusCode::SERVICE_UNAVAILABLE, messages.network);
                api.body.is_network_error = true;
                api
            }
            FailureClass::Timeout => {
                let mut api = Self::new(StatusCode::REQUEST_TIMEOUT, messages.timeout);
                api.body.is_timeout_error = true;
                api
            }
            FailureClass::Other if error.message() == messages.empty => {
                Self::internal(messages.empty)
            }
            FailureClass::Other => Self::internal(messages.generic),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
