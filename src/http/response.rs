//! Caller-visible responses produced by the gate itself.
//!
//! # Responsibilities
//! - Render a blocked verdict as `403` with the JSON error body
//! - Render the status endpoint body
//! - Map extraction failures to `413`/`400`

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gate::Verdict;
use crate::http::extract::ExtractError;

/// JSON body returned with a blocked request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockBody {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub code: u16,
}

impl BlockBody {
    /// Body for a blocked verdict; `None` when the verdict allows.
    pub fn from_verdict(verdict: &Verdict) -> Option<Self> {
        let message = verdict.message()?;
        let reason = Some(verdict.reason())
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        Some(Self {
            error: true,
            message: message.to_string(),
            reason,
            code: verdict.http_status(),
        })
    }
}

/// Response for a blocked verdict. Allowed verdicts have no response of their own.
pub fn block_response(verdict: &Verdict) -> Option<Response> {
    let body = BlockBody::from_verdict(verdict)?;
    let status = StatusCode::from_u16(body.code).unwrap_or(StatusCode::FORBIDDEN);
    Some((status, Json(body)).into_response())
}

/// Body of the gate's status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    pub success: bool,
    pub blocked: bool,
    pub reason: String,
    pub ip: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl StatusBody {
    pub fn new(verdict: &Verdict, ip: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            success: true,
            blocked: !verdict.allowed(),
            reason: verdict.reason().to_string(),
            ip: ip.into(),
            timestamp,
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let status = match self {
            ExtractError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractError::BodyRead(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(serde_json::json!({
                "error": true,
                "message": self.to_string(),
                "code": status.as_u16(),
            })),
        )
            .into_response()
    }
}
