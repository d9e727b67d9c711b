//! HTTP boundary of the gate.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware.rs (gate_middleware)
//!         → extract.rs (buffer body, build RequestContext)
//!         → RequestGate::inspect
//!         → blocked: response.rs (403 JSON), request ends here
//!         → allowed: original request continues
//!     → server.rs forward_handler → upstream application
//! ```

pub mod extract;
pub mod middleware;
pub mod response;
pub mod server;

pub use middleware::{gate_middleware, protect, GateState};
pub use server::{GateServer, ServerError};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";
