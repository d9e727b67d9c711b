//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, env credential override)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → handed by value to the authority clients and the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AuthorityConfig;
pub use schema::GateConfig;
pub use schema::InspectionConfig;
pub use schema::ObservabilityConfig;
