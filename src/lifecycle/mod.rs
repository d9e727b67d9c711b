//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Build gate → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Server stops accepting → In-flight requests drain
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when the gate is ready)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
