//! Best-effort security event logging.
//!
//! # Responsibilities
//! - Report security events to the authority's logging endpoint
//! - Keep the call off the request path (detached task, short deadline)
//! - Swallow every failure after a diagnostic
//!
//! # Design Decisions
//! - `log` returns immediately; the verdict never waits on it
//! - The logging deadline is shorter than the decision deadline
//! - Without a Tokio runtime the event is dropped, not sent inline

use std::time::Duration;

use tokio::runtime::Handle;

use crate::authority::types::{AuthorityError, AuthorityResult, LogEventPayload, SecurityEvent};
use crate::authority::{endpoint_url, http_client, LOG_EVENT_PATH};
use crate::config::AuthorityConfig;
use crate::observability::metrics;

/// Fire-and-forget client for `POST /api/log_event`.
#[derive(Clone)]
pub struct EventLogger {
    http: reqwest::Client,
    url: String,
    api_key: String,
    enabled: bool,
    timeout: Duration,
}

impl EventLogger {
    /// Create a logger with its own HTTP connection pool.
    pub fn new(config: &AuthorityConfig) -> AuthorityResult<Self> {
        Ok(Self::with_http(config, http_client(config)?))
    }

    /// Create a logger over an existing HTTP client.
    pub fn with_http(config: &AuthorityConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            url: endpoint_url(&config.base_url, LOG_EVENT_PATH),
            api_key: config.api_key.clone(),
            enabled: config.enabled,
            timeout: Duration::from_millis(config.log_timeout_ms),
        }
    }

    /// Report an event without waiting for it.
    pub fn log(&self, event: SecurityEvent) {
        if !self.enabled {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(
                event_type = %event.event_type,
                "No async runtime available, dropping security event"
            );
            metrics::record_authority_failure("log_event", "no_runtime");
            return;
        };

        let logger = self.clone();
        handle.spawn(async move {
            if let Err(e) = logger.send(&event).await {
                tracing::warn!(
                    error = %e,
                    event_type = %event.event_type,
                    ip = %event.client_address,
                    "Failed to log security event"
                );
                metrics::record_authority_failure("log_event", e.kind());
            }
        });
    }

    /// Send one event and wait for the outcome. The response body is ignored.
    pub async fn send(&self, event: &SecurityEvent) -> AuthorityResult<()> {
        let payload = LogEventPayload::new(&self.api_key, event);

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Status(status.as_u16()));
        }

        tracing::debug!(event_type = %event.event_type, "Security event logged");
        Ok(())
    }

    /// Configured deadline for one logging call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger")
            .field("url", &self.url)
            .field("enabled", &self.enabled)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthorityConfig {
        AuthorityConfig {
            enabled: true,
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            decision_timeout_ms: 300,
            log_timeout_ms: 100,
            use_system_proxy: false,
        }
    }

    #[test]
    fn test_log_without_runtime_does_not_panic() {
        let logger = EventLogger::new(&config()).unwrap();
        logger.log(SecurityEvent::new("sql_injection", "Input: '--", "198.51.100.1"));
    }

    #[tokio::test]
    async fn test_log_to_unreachable_authority_returns_immediately() {
        let logger = EventLogger::new(&config()).unwrap();
        let start = std::time::Instant::now();
        logger.log(SecurityEvent::new("xss_attack", "Input: <embed>", "198.51.100.1"));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_send_reports_failure() {
        let logger = EventLogger::new(&config()).unwrap();
        let result = logger
            .send(&SecurityEvent::new("xss_attack", "Input: <embed>", "198.51.100.1"))
            .await;
        assert!(result.is_err());
    }
}
