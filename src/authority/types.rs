//! Wire types and error definitions for the authority protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::gate::context::RequestContext;

/// Reason used when the authority blocks without saying why.
pub const DEFAULT_BLOCK_REASON: &str = "Security violation";

/// Body of `POST /api/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionQuery {
    pub api_key: String,
    pub ip: String,
    pub endpoint: String,
    pub method: String,
    pub user_agent: String,
}

impl DecisionQuery {
    pub fn new(api_key: &str, ctx: &RequestContext) -> Self {
        Self {
            api_key: api_key.to_string(),
            ip: ctx.client_address.clone(),
            endpoint: ctx.path.clone(),
            method: ctx.method.clone(),
            user_agent: ctx.user_agent.clone(),
        }
    }
}

/// The authority's answer, after fail-open interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionResult {
    pub blocked: bool,
    pub reason: Option<String>,
}

impl DecisionResult {
    /// Not blocked. Also the fail-open result.
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
        }
    }

    /// Interpret a decoded response body.
    ///
    /// Anything other than an object with a truthy `blocked` field is "not blocked".
    pub fn from_response(body: &Value) -> Self {
        let Some(object) = body.as_object() else {
            return Self::allow();
        };

        if !object.get("blocked").is_some_and(truthy) {
            return Self::allow();
        }

        let reason = object
            .get("reason")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_BLOCK_REASON);

        Self::block(reason)
    }

    /// Decode raw response bytes.
    pub fn from_bytes(body: &[u8]) -> Result<Self, AuthorityError> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_response(&value))
    }
}

/// Loose truthiness: `true`, non-zero numbers, non-empty strings other than
/// `"0"`, non-empty arrays and objects.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A security-relevant occurrence reported to the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEvent {
    pub event_type: String,
    pub details: String,
    pub client_address: String,
}

impl SecurityEvent {
    pub fn new(
        event_type: impl Into<String>,
        details: impl Into<String>,
        client_address: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            details: details.into(),
            client_address: client_address.into(),
        }
    }
}

/// Body of `POST /api/log_event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEventPayload {
    pub api_key: String,
    pub event_type: String,
    pub ip: String,
    pub details: String,
}

impl LogEventPayload {
    pub fn new(api_key: &str, event: &SecurityEvent) -> Self {
        Self {
            api_key: api_key.to_string(),
            event_type: event.event_type.clone(),
            ip: event.client_address.clone(),
            details: event.details.clone(),
        }
    }
}

/// Failures talking to the authority. Never surfaced to gated callers.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// Connection refused, reset, DNS failure and the like.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The call exceeded its deadline.
    #[error("authority call timed out")]
    Timeout,

    /// The authority answered with a non-success status.
    #[error("authority returned status {0}")]
    Status(u16),

    /// The body was not valid JSON.
    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AuthorityError {
    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorityError::Transport(_) => "transport",
            AuthorityError::Timeout => "timeout",
            AuthorityError::Status(_) => "status",
            AuthorityError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for AuthorityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthorityError::Timeout
        } else {
            AuthorityError::Transport(err)
        }
    }
}

/// Result type for authority operations.
pub type AuthorityResult<T> = Result<T, AuthorityError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blocked_with_reason() {
        let result = DecisionResult::from_response(&json!({
            "blocked": true,
            "reason": "rate limit exceeded"
        }));
        assert_eq!(result, DecisionResult::block("rate limit exceeded"));
    }

    #[test]
    fn test_blocked_without_reason_uses_default() {
        let result = DecisionResult::from_response(&json!({"blocked": true}));
        assert_eq!(result.reason.as_deref(), Some(DEFAULT_BLOCK_REASON));

        let result = DecisionResult::from_response(&json!({"blocked": 1, "reason": ""}));
        assert_eq!(result.reason.as_deref(), Some(DEFAULT_BLOCK_REASON));
    }

    #[test]
    fn test_missing_or_falsy_blocked_is_allow() {
        for body in [
            json!({}),
            json!({"status": "ok"}),
            json!({"blocked": false, "reason": "ignored"}),
            json!({"blocked": null}),
            json!({"blocked": 0}),
            json!({"blocked": "0"}),
            json!({"blocked": ""}),
            json!(null),
            json!([{"blocked": true}]),
            json!("blocked"),
        ] {
            assert_eq!(DecisionResult::from_response(&body), DecisionResult::allow(), "{body}");
        }
    }

    #[test]
    fn test_truthy_variants_block() {
        for blocked in [json!(true), json!(1), json!("yes"), json!([1])] {
            let result = DecisionResult::from_response(&json!({"blocked": blocked}));
            assert!(result.blocked);
        }
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = DecisionResult::from_bytes(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, AuthorityError::Decode(_)));
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_query_copies_context() {
        let ctx = RequestContext::new("203.0.113.9", "POST", "/login?next=/")
            .with_user_agent("curl/8.0");
        let query = DecisionQuery::new("key", &ctx);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "api_key": "key",
                "ip": "203.0.113.9",
                "endpoint": "/login?next=/",
                "method": "POST",
                "user_agent": "curl/8.0",
            })
        );
    }

    #[test]
    fn test_log_payload_shape() {
        let event = SecurityEvent::new("xss_attack", "Input: <embed>", "198.51.100.4");
        let payload = LogEventPayload::new("key", &event);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "api_key": "key",
                "event_type": "xss_attack",
                "ip": "198.51.100.4",
                "details": "Input: <embed>",
            })
        );
    }
}
