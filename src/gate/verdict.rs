//! The gate's terminal decision for one request.

use crate::inspection::ThreatFinding;

/// Reason given when local inspection blocks a request.
pub const MALICIOUS_INPUT_REASON: &str = "malicious input detected";

/// Generic message shown to callers blocked by the authority.
pub const ACCESS_DENIED_MESSAGE: &str = "Zugriff verweigert / Erisim engellendi";

/// Generic message shown to callers whose input was rejected.
pub const MALICIOUS_INPUT_MESSAGE: &str = "Schaedlicher Inhalt erkannt / Zararli icerik tespit edildi";

/// Why a request was blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockCause {
    /// The remote authority denied the request.
    RemoteBlocked,
    /// A request value matched a local signature.
    ThreatDetected(ThreatFinding),
}

/// Allow or block, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block { cause: BlockCause, reason: String },
}

impl Verdict {
    pub fn remote_blocked(reason: impl Into<String>) -> Self {
        Verdict::Block {
            cause: BlockCause::RemoteBlocked,
            reason: reason.into(),
        }
    }

    pub fn threat(finding: ThreatFinding) -> Self {
        Verdict::Block {
            cause: BlockCause::ThreatDetected(finding),
            reason: MALICIOUS_INPUT_REASON.to_string(),
        }
    }

    pub fn allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Verdict::Allow => 200,
            Verdict::Block { .. } => 403,
        }
    }

    /// Block reason; empty when allowed.
    pub fn reason(&self) -> &str {
        match self {
            Verdict::Allow => "",
            Verdict::Block { reason, .. } => reason,
        }
    }

    /// Generic caller-facing message for a blocked request.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Verdict::Allow => None,
            Verdict::Block { cause: BlockCause::RemoteBlocked, .. } => Some(ACCESS_DENIED_MESSAGE),
            Verdict::Block { cause: BlockCause::ThreatDetected(_), .. } => Some(MALICIOUS_INPUT_MESSAGE),
        }
    }

    /// Metrics label for the outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Block { cause: BlockCause::RemoteBlocked, .. } => "remote_block",
            Verdict::Block { cause: BlockCause::ThreatDetected(_), .. } => "threat",
        }
    }
}
