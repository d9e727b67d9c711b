//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the request gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The protected application allowed requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Remote decision authority.
    pub authority: AuthorityConfig,

    /// Local inspection settings.
    pub inspection: InspectionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Remote authority configuration.
///
/// Loaded once at start-up and handed to the decision client and the event
/// logger by value. Never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Master switch. When false every request is allowed without inspection.
    pub enabled: bool,

    /// Base URL of the authority (e.g., "http://localhost:5050").
    pub base_url: String,

    /// API credential sent with every call.
    pub api_key: String,

    /// Deadline for the decision call in milliseconds.
    pub decision_timeout_ms: u64,

    /// Deadline for the event logging call in milliseconds.
    pub log_timeout_ms: u64,

    /// Honour HTTP(S)_PROXY environment variables for authority calls.
    pub use_system_proxy: bool,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:5050".to_string(),
            api_key: String::new(),
            decision_timeout_ms: 2000,
            log_timeout_ms: 1000,
            use_system_proxy: false,
        }
    }
}

/// Local inspection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InspectionConfig {
    /// Largest request body buffered for inspection; larger bodies get 413.
    pub max_body_bytes: usize,

    /// Path of the JSON status endpoint served by the gate itself.
    pub status_path: String,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
            status_path: "/gate/check".to_string(),
        }
    }
}

/// Timeout configuration for the served requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
