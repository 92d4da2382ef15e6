//! Request identification and request bodies.
//!
//! # Responsibilities
//! - Assign a UUID v4 request ID to every request (kept if the client sent one)
//! - Echo the ID back on the response
//! - Put the ID on the request span so every log line carries it
//! - Define the JSON bodies the routes accept

use axum::body::Body;
use axum::http::{HeaderName, Request};
use serde::Deserialize;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

use crate::backend::types::EditMode;
use crate::drawing::{CanvasEvent, DisplayMapping, ToolSettings};

pub const X_REQUEST_ID: &str = "x-request-id";

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Span for `TraceLayer::make_span_with`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageBody {
    pub image_url: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub mask_url: Option<String>,
    pub prompt: Option<String>,
    #[serde(default)]
    pub mode: EditMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoBody {
    pub image_url: Option<String>,
    pub prompt: Option<String>,
    pub duration: Option<String>,
    pub cfg_scale: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePromptsBody {
    pub user_prompt: Option<String>,
    pub num_stages: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTravelBody {
    pub image_url: Option<String>,
    pub prompt: Option<String>,
    pub num_stages: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskBody {
    pub image_url: Option<String>,
    #[serde(default)]
    pub settings: ToolSettings,
    #[serde(default)]
    pub events: Vec<CanvasEvent>,
    #[serde(default)]
    pub display: DisplayMapping,
}

/// Non-blank trimmed value, if any.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_body_accepts_both_shapes() {
        let single: EditImageBody =
            serde_json::from_str(r#"{"imageUrl":"a","prompt":"p"}"#).unwrap();
        assert_eq!(single.image_url.as_deref(), Some("a"));
        assert_eq!(single.mode, EditMode::Single);

        let multi: EditImageBody =
            serde_json::from_str(r#"{"imageUrls":["a","b"],"prompt":"p","mode":"multi"}"#).unwrap();
        assert_eq!(multi.image_urls.unwrap().len(), 2);
        assert_eq!(multi.mode, EditMode::Multi);
    }

    #[test]
    fn test_unknown_mode_is_single() {
        let body: EditImageBody =
            serde_json::from_str(r#"{"imageUrl":"a","prompt":"p","mode":"bogus"}"#).unwrap();
        assert_eq!(body.mode, EditMode::Single);

        let body: EditImageBody =
            serde_json::from_str(r#"{"imageUrl":"a","prompt":"p","mode":"photoshop"}"#).unwrap();
        assert_eq!(body.mode, EditMode::Photoshop);
    }

    #[test]
    fn test_present() {
        assert_eq!(present(Some("  ".into())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("x".into())).as_deref(), Some("x"));
    }
}
