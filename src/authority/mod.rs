//! Remote decision authority protocol.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → decision.rs (POST /api/check, bounded by decision_timeout_ms)
//!     → DecisionResult (fail-open on any failure)
//!
//! SecurityEvent
//!     → events.rs (detached POST /api/log_event, bounded by log_timeout_ms)
//!     → response ignored
//! ```
//!
//! # Design Decisions
//! - Availability over enforcement: an unreachable authority never blocks
//! - Failures are operator-visible only (warn! diagnostics + failure metrics)
//! - No retries and no backoff; each request is independent

pub mod decision;
pub mod events;
pub mod types;

pub use decision::DecisionClient;
pub use events::EventLogger;
pub use types::{
    AuthorityError, AuthorityResult, DecisionQuery, DecisionResult, SecurityEvent,
    DEFAULT_BLOCK_REASON,
};

use crate::config::AuthorityConfig;

/// Decision endpoint path on the authority.
pub const CHECK_PATH: &str = "/api/check";

/// Event logging endpoint path on the authority.
pub const LOG_EVENT_PATH: &str = "/api/log_event";

/// Build the HTTP client shared by the decision client and the event logger.
///
/// Deadlines are applied per call, not here.
pub fn http_client(config: &AuthorityConfig) -> AuthorityResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("request-gate/", env!("CARGO_PKG_VERSION")));
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

/// Join the configured base URL and an endpoint path.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
