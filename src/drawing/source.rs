//! Background image sources.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;
use std::path::PathBuf;
use std::time::Duration;

use crate::drawing::error::{DrawingError, DrawingResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a background comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
    /// `http(s)://` URL or `data:` URL.
    Url(String),
}

impl ImageSource {
    /// Classify a string the way callers pass images around.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") || value.starts_with("data:") {
            ImageSource::Url(value.to_string())
        } else {
            ImageSource::Path(PathBuf::from(value))
        }
    }

    /// Fetch and decode. Decoding runs on the blocking pool.
    pub async fn load(self) -> DrawingResult<DynamicImage> {
        let bytes = match self {
            ImageSource::Bytes(bytes) => bytes,
            ImageSource::Path(path) => tokio::fs::read(&path).await?,
            ImageSource::Url(url) if url.starts_with("data:") => decode_data_url(&url)?,
            ImageSource::Url(url) => fetch(&url).await?,
        };

        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| DrawingError::Fetch(format!("decode task failed: {e}")))?
            .map_err(DrawingError::from)
    }
}

/// Payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> DrawingResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DrawingError::DataUrl("missing data: scheme".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| DrawingError::DataUrl("missing ',' separator".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(DrawingError::DataUrl("only base64 payloads are supported".to_string()));
    }
    Ok(BASE64.decode(payload.trim())?)
}

async fn fetch(url: &str) -> DrawingResult<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| DrawingError::Fetch(e.to_string()))?;

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| DrawingError::Fetch(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DrawingError::Fetch(format!("{url} returned {status}")));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| DrawingError::Fetch(e.to_string()))?;
    Ok(bytes.to_vec())
}
