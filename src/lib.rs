//! Per-request security gate library.
//!
//! Decides for every inbound HTTP request whether it may reach the protected
//! application, consulting a remote decision authority (fail-open) and local
//! injection signatures.

pub mod authority;
pub mod config;
pub mod gate;
pub mod http;
pub mod inspection;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GateConfig;
pub use gate::{RequestContext, RequestGate, Verdict};
pub use http::{protect, GateServer, GateState};
pub use lifecycle::Shutdown;
