//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Keep the logging deadline at or below the decision deadline
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GateConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.address must not be empty")]
    EmptyUpstream,

    #[error("authority.base_url '{0}' is not an http(s) URL")]
    AuthorityUrl(String),

    #[error("authority.api_key must be set when the authority is enabled")]
    MissingApiKey,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("authority.log_timeout_ms ({log_ms}) exceeds decision_timeout_ms ({decision_ms})")]
    LogTimeoutTooLong { log_ms: u64, decision_ms: u64 },

    #[error("inspection.status_path '{0}' must start with '/'")]
    StatusPath(String),

    #[error("observability.log_format '{0}' is not one of: pretty, json")]
    LogFormat(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.upstream.address.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstream);
    }

    let authority = &config.authority;
    match Url::parse(&authority.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push(ValidationError::AuthorityUrl(authority.base_url.clone())),
    }

    if authority.enabled && authority.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    if authority.decision_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("authority.decision_timeout_ms"));
    }
    if authority.log_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("authority.log_timeout_ms"));
    }
    if authority.log_timeout_ms > authority.decision_timeout_ms {
        errors.push(ValidationError::LogTimeoutTooLong {
            log_ms: authority.log_timeout_ms,
            decision_ms: authority.decision_timeout_ms,
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if !config.inspection.status_path.starts_with('/') {
        errors.push(ValidationError::StatusPath(config.inspection.status_path.clone()));
    }

    let format = config.observability.log_format.as_str();
    if format != "pretty" && format != "json" {
        errors.push(ValidationError::LogFormat(format.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GateConfig {
        let mut config = GateConfig::default();
        config.authority.api_key = "key".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_api_key_only_when_enabled() {
        let mut config = valid_config();
        config.authority.api_key.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingApiKey]);

        config.authority.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.listener.bind_address = "not-an-address".to_string();
        config.authority.base_url = "ftp://firewall".to_string();
        config.authority.log_timeout_ms = 5000;
        config.inspection.status_path = "check".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::LogTimeoutTooLong {
            log_ms: 5000,
            decision_ms: 2000
        }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.authority.decision_timeout_ms = 0;
        config.authority.log_timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroTimeout("authority.decision_timeout_ms")));
        assert!(errors.contains(&ValidationError::ZeroTimeout("authority.log_timeout_ms")));
    }
}
