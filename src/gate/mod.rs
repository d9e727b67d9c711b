//! Per-request orchestration.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → DecisionClient::decide   (blocked? → Verdict::Block, stop)
//!     → inspection::scan_parameters (finding? → log event, Verdict::Block, stop)
//!     → Verdict::Allow
//! ```
//!
//! # Design Decisions
//! - Strictly sequential, single pass; no retries
//! - Once blocked, no further classification or remote calls
//! - Holds only immutable configuration, so one gate serves all requests

pub mod context;
pub mod verdict;

pub use context::{ParamValue, Parameters, RequestContext};
pub use verdict::{BlockCause, Verdict};

use crate::authority::{http_client, AuthorityResult, DecisionClient, EventLogger, SecurityEvent};
use crate::config::AuthorityConfig;
use crate::inspection;
use crate::observability::metrics;

/// The security gate in front of the protected application.
#[derive(Debug, Clone)]
pub struct RequestGate {
    enabled: bool,
    decisions: DecisionClient,
    events: EventLogger,
}

impl RequestGate {
    /// Build a gate whose decision client and event logger share one HTTP client.
    pub fn new(config: &AuthorityConfig) -> AuthorityResult<Self> {
        let http = http_client(config)?;
        Ok(Self::from_parts(
            config.enabled,
            DecisionClient::with_http(config, http.clone()),
            EventLogger::with_http(config, http),
        ))
    }

    pub fn from_parts(enabled: bool, decisions: DecisionClient, events: EventLogger) -> Self {
        Self {
            enabled,
            decisions,
            events,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide whether one request may proceed.
    pub async fn inspect(&self, ctx: &RequestContext) -> Verdict {
        if !self.enabled {
            return Verdict::Allow;
        }

        let decision = self.decisions.decide(ctx).await;
        let verdict = if decision.blocked {
            Verdict::remote_blocked(decision.reason.unwrap_or_default())
        } else {
            match inspection::scan_parameters(&ctx.parameters) {
                Some(finding) => {
                    tracing::warn!(
                        ip = %ctx.client_address,
                        endpoint = %ctx.path,
                        parameter = %finding.parameter,
                        category = %finding.category,
                        "Malicious input detected"
                    );
                    metrics::record_threat(finding.category.as_str());
                    self.events.log(SecurityEvent::new(
                        finding.category.event_type(),
                        finding.details(),
                        ctx.client_address.clone(),
                    ));
                    Verdict::threat(finding)
                }
                None => Verdict::Allow,
            }
        };

        metrics::record_verdict(verdict.outcome());
        verdict
    }
}
