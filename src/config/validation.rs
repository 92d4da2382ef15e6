//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays and timeouts > 0, bounding box non-empty)
//! - Check URLs and the bind address parse
//! - Ensure the facade timeout covers every retry policy
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Missing credentials are not an error; they surface per request

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{AppConfig, RetryPolicy};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("policies.{policy}.{field} must be greater than zero")]
    NonPositive { policy: String, field: &'static str },

    #[error("policies.{policy}: max_delay_ms ({max_delay_ms}) is below base_delay_ms ({base_delay_ms})")]
    DelayInverted {
        policy: String,
        base_delay_ms: u64,
        max_delay_ms: u64,
    },

    #[error("timeouts.request_secs ({configured_secs}s) is shorter than the {policy} policy worst case ({required_secs}s)")]
    RequestTimeoutTooShort {
        policy: String,
        configured_secs: u64,
        required_secs: u64,
    },

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("{field} '{value}' is not a valid http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("drawing bounding box must be non-empty (got {width}x{height})")]
    EmptyBoundingBox { width: u32, height: u32 },

    #[error("completion.temperature {0} is outside 0.0..=2.0")]
    InvalidTemperature(f32),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    check_url(&mut errors, "backend.base_url", &config.backend.base_url);
    check_url(&mut errors, "backend.health_url", &config.backend.health_url);
    check_url(&mut errors, "completion.base_url", &config.completion.base_url);

    for (name, policy) in config.policies.iter() {
        check_policy(&mut errors, name, policy, config.timeouts.request_secs);
    }

    if config.drawing.max_width == 0 || config.drawing.max_height == 0 {
        errors.push(ValidationError::EmptyBoundingBox {
            width: config.drawing.max_width,
            height: config.drawing.max_height,
        });
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        errors.push(ValidationError::InvalidTemperature(
            config.completion.temperature,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_policy(
    errors: &mut Vec<ValidationError>,
    name: &str,
    policy: &RetryPolicy,
    request_secs: u64,
) {
    let positive = [
        ("base_delay_ms", policy.base_delay_ms),
        ("max_delay_ms", policy.max_delay_ms),
        ("timeout_ms", policy.timeout_ms),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::NonPositive {
                policy: name.to_string(),
                field,
            });
        }
    }

    if policy.max_delay_ms < policy.base_delay_ms {
        errors.push(ValidationError::DelayInverted {
            policy: name.to_string(),
            base_delay_ms: policy.base_delay_ms,
            max_delay_ms: policy.max_delay_ms,
        });
    }

    let required = policy.worst_case();
    if required.as_secs_f64() > request_secs as f64 {
        errors.push(ValidationError::RequestTimeoutTooShort {
            policy: name.to_string(),
            configured_secs: request_secs,
            required_secs: required.as_secs_f64().ceil() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.policies.image_edit.timeout_ms = 0;
        config.policies.video.max_delay_ms = 10;
        config.backend.base_url = "ftp://fal.run".to_string();
        config.drawing.max_height = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::NonPositive {
            policy: "image_edit".into(),
            field: "timeout_ms",
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DelayInverted { policy, .. } if policy == "video")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidUrl { field: "backend.base_url", .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyBoundingBox { .. })));
    }

    #[test]
    fn test_request_timeout_must_cover_policies() {
        let mut config = AppConfig::default();
        config.timeouts.request_secs = 600;

        let errors = validate_config(&config).unwrap_err();
        // image edit: 906.6s, video: 845.5s
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "timeouts.request_secs (600s) is shorter than the image_edit policy worst case (907s)"
        );
    }

    #[test]
    fn test_temperature_range() {
        let mut config = AppConfig::default();
        config.completion.temperature = 2.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidTemperature(2.5)]);
    }
}
