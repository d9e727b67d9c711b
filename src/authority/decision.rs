//! Decision client with fail-open failure policy.
//!
//! # Responsibilities
//! - Send the request identity to the authority's check endpoint
//! - Bound the call by a short fixed deadline
//! - Turn every failure into "not blocked" plus an operator diagnostic
//!
//! # Design Decisions
//! - Fail open: availability of the protected application takes precedence
//!   over strict enforcement while the authority is unreachable or slow
//! - Dropping the returned future abandons the call with no side effects

use std::time::{Duration, Instant};

use crate::authority::types::{AuthorityError, AuthorityResult, DecisionQuery, DecisionResult};
use crate::authority::{endpoint_url, http_client, CHECK_PATH};
use crate::config::AuthorityConfig;
use crate::gate::context::RequestContext;
use crate::observability::metrics;

/// Client for `POST /api/check`.
#[derive(Clone)]
pub struct DecisionClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    enabled: bool,
    timeout: Duration,
}

impl DecisionClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(config: &AuthorityConfig) -> AuthorityResult<Self> {
        Ok(Self::with_http(config, http_client(config)?))
    }

    /// Create a client over an existing HTTP client.
    pub fn with_http(config: &AuthorityConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            url: endpoint_url(&config.base_url, CHECK_PATH),
            api_key: config.api_key.clone(),
            enabled: config.enabled,
            timeout: Duration::from_millis(config.decision_timeout_ms),
        }
    }

    /// Ask the authority whether this request is blocked.
    ///
    /// Never fails: transport errors, timeouts, non-success statuses and
    /// undecodable bodies all yield [`DecisionResult::allow`].
    pub async fn decide(&self, ctx: &RequestContext) -> DecisionResult {
        if !self.enabled {
            return DecisionResult::allow();
        }

        let start = Instant::now();
        let result = match self.query(ctx).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    ip = %ctx.client_address,
                    endpoint = %ctx.path,
                    "Authority unavailable, failing open"
                );
                metrics::record_authority_failure("check", e.kind());
                DecisionResult::allow()
            }
        };
        metrics::record_decision_latency(start);

        if result.blocked {
            tracing::info!(
                ip = %ctx.client_address,
                endpoint = %ctx.path,
                reason = result.reason.as_deref().unwrap_or_default(),
                "Authority blocked request"
            );
        }
        result
    }

    /// Perform the call and surface every failure.
    pub async fn query(&self, ctx: &RequestContext) -> AuthorityResult<DecisionResult> {
        let query = DecisionQuery::new(&self.api_key, ctx);

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .json(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        DecisionResult::from_bytes(&body)
    }

    /// Configured deadline for one decision call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for DecisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionClient")
            .field("url", &self.url)
            .field("enabled", &self.enabled)
            .field("timeout", &self.timeout)
            .finish()
    }
}
