//! Backend credentials.
//!
//! A [`Credentials`] value can only exist for a key that passed validation,
//! so the client never has to re-check it per call.

use std::fmt;

use crate::config::schema::PLACEHOLDER_API_KEY;
use crate::resilience::CallError;

/// Shown to the caller when no usable key is configured.
pub const MISSING_KEY_MESSAGE: &str = "FAL API key not configured. Please sign up at https://fal.ai to get your API key and add it to the FAL_KEY environment variable";

/// A validated generative backend API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
}

impl Credentials {
    /// Validate `key`: it must be non-empty and not the shipped placeholder.
    pub fn new(key: impl Into<String>) -> Result<Self, CallError> {
        let key = key.into().trim().to_string();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            return Err(CallError::authentication(MISSING_KEY_MESSAGE));
        }
        Ok(Self { key })
    }

    /// Build from an optional configured key.
    pub fn from_option(key: Option<&str>) -> Result<Self, CallError> {
        match key {
            Some(key) => Self::new(key),
            None => Err(CallError::authentication(MISSING_KEY_MESSAGE)),
        }
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!("Key {}", self.key)
    }

    /// First 8 characters followed by `...`.
    pub fn preview(&self) -> String {
        key_preview(Some(&self.key))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.preview())
            .finish()
    }
}

/// Preview an optional key for reports; `not-set` when absent.
pub fn key_preview(key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => {
            let head: String = key.chars().take(8).collect();
            format!("{head}...")
        }
        _ => "not-set".to_string(),
    }
}
