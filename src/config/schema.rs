//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder shipped in sample `.env` files; treated as "not set".
pub const PLACEHOLDER_API_KEY: &str = "your_fal_api_key_here";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Generative backend (image edit + video models).
    pub backend: BackendConfig,

    /// Text-completion model used for stage prompts.
    pub completion: CompletionConfig,

    /// Retry policies per call site.
    pub policies: PolicyConfig,

    /// Timeout configuration for the HTTP facade.
    pub timeouts: TimeoutConfig,

    /// Mask drawing canvas settings.
    pub drawing: DrawingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Generative backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL models are addressed under (`{base_url}/{model}`).
    pub base_url: String,

    /// API key. Usually supplied through `FAL_KEY` rather than the file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Image-editing model id.
    pub image_edit_model: String,

    /// Image-to-video model id.
    pub video_model: String,

    /// Endpoint probed by the health check.
    pub health_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Health probe timeout in seconds.
    pub health_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fal.run".to_string(),
            api_key: None,
            image_edit_model: "fal-ai/nano-banana/edit".to_string(),
            video_model: "fal-ai/kling-video/v2.1/pro/image-to-video".to_string(),
            health_url: "https://fal.run/health".to_string(),
            connect_timeout_secs: 10,
            health_timeout_secs: 10,
        }
    }
}

/// Text-completion (chat) model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API base URL; requests go to `{base_url}/chat/completions`.
    pub base_url: String,

    /// API key. Usually supplied through `OPENAI_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

/// Retry policy for one kind of backend call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = max_retries + 1).
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Deadline for a single attempt in milliseconds.
    pub timeout_ms: u64,
}

impl RetryPolicy {
    /// Image edits: moderate retries, 5 minute attempts.
    pub fn image_edit() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 2000,
            max_delay_ms: 8000,
            timeout_ms: 300_000,
        }
    }

    /// Video generation: attempts are expensive, so a single retry with a
    /// 7 minute deadline.
    pub fn video() -> Self {
        Self {
            max_retries: 1,
            base_delay_ms: 5000,
            max_delay_ms: 8000,
            timeout_ms: 420_000,
        }
    }

    /// Stage prompt completion.
    pub fn prompts() -> Self {
        Self {
            max_retries: 1,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            timeout_ms: 60_000,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Longest a call can take: every attempt hits its deadline and every
    /// backoff draws maximal jitter.
    pub fn worst_case(&self) -> Duration {
        let attempts = u64::from(self.max_retries) + 1;
        let waiting = self.timeout_ms.saturating_mul(attempts);
        let sleeping: u64 = (0..self.max_retries)
            .map(|attempt| {
                let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
                let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
                delay.saturating_add(delay / 10)
            })
            .fold(0u64, u64::saturating_add);
        Duration::from_millis(waiting.saturating_add(sleeping))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            timeout_ms: 30_000,
        }
    }
}

/// Retry policies per call site.
///
/// A partially specified section keeps its own call site's values for the
/// fields it leaves out, not the generic [`RetryPolicy::default`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(from = "PolicyOverrides")]
pub struct PolicyConfig {
    pub image_edit: RetryPolicy,
    pub video: RetryPolicy,
    pub prompts: RetryPolicy,
}

/// Fields of one `[policies.*]` section as written in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PolicyOverride {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    timeout_ms: Option<u64>,
}

impl PolicyOverride {
    fn over(self, base: RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            base_delay_ms: self.base_delay_ms.unwrap_or(base.base_delay_ms),
            max_delay_ms: self.max_delay_ms.unwrap_or(base.max_delay_ms),
            timeout_ms: self.timeout_ms.unwrap_or(base.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PolicyOverrides {
    image_edit: PolicyOverride,
    video: PolicyOverride,
    prompts: PolicyOverride,
}

impl From<PolicyOverrides> for PolicyConfig {
    fn from(overrides: PolicyOverrides) -> Self {
        Self {
            image_edit: overrides.image_edit.over(RetryPolicy::image_edit()),
            video: overrides.video.over(RetryPolicy::video()),
            prompts: overrides.prompts.over(RetryPolicy::prompts()),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            image_edit: RetryPolicy::image_edit(),
            video: RetryPolicy::video(),
            prompts: RetryPolicy::prompts(),
        }
    }
}

impl PolicyConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RetryPolicy)> {
        [
            ("image_edit", &self.image_edit),
            ("video", &self.video),
            ("prompts", &self.prompts),
        ]
        .into_iter()
    }
}

/// Timeout configuration for the HTTP facade.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds. Must cover the worst case of every
    /// retry policy, or the facade gives up before the executor does.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 1200 }
    }
}

/// Mask drawing canvas configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Bounding box the background is fitted into.
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            max_width: 512,
            max_height: 384,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes. Images travel as data URLs.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 25 * 1024 * 1024, // 25MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_site_policies() {
        let policies = PolicyConfig::default();
        assert_eq!(policies.image_edit.max_retries, 2);
        assert_eq!(policies.image_edit.base_delay_ms, 2000);
        assert_eq!(policies.image_edit.timeout_ms, 300_000);
        assert_eq!(policies.video.max_retries, 1);
        assert_eq!(policies.video.base_delay_ms, 5000);
        assert_eq!(policies.video.timeout(), Duration::from_secs(420));
    }

    #[test]
    fn test_worst_case() {
        // 3 x 300s + (2000 + 200) + (4000 + 400)
        assert_eq!(RetryPolicy::image_edit().worst_case(), Duration::from_millis(906_600));
        // 2 x 420s + 5000 + 500
        assert_eq!(RetryPolicy::video().worst_case(), Duration::from_millis(845_500));
    }

    #[test]
    fn test_minimal_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [policies.video]
            max_retries = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.policies.video.max_retries, 0);
        // Unspecified fields keep the video policy's own values.
        assert_eq!(config.policies.video.timeout_ms, 420_000);
        assert_eq!(config.policies.video.base_delay_ms, 5000);
        assert_eq!(config.policies.image_edit, RetryPolicy::image_edit());
        assert_eq!(config.drawing.max_width, 512);
        assert!(config.backend.api_key.is_none());
    }

    #[test]
    fn test_partial_policy_keeps_call_site_values() {
        let config: AppConfig = toml::from_str(
            r#"
            [policies.image_edit]
            timeout_ms = 1000

            [policies.prompts]
            max_retries = 4
            "#,
        )
        .unwrap();
        assert_eq!(
            config.policies.image_edit,
            RetryPolicy {
                timeout_ms: 1000,
                ..RetryPolicy::image_edit()
            }
        );
        assert_eq!(
            config.policies.prompts,
            RetryPolicy {
                max_retries: 4,
                ..RetryPolicy::prompts()
            }
        );
        assert_eq!(config.policies.video, RetryPolicy::video());
    }
}
