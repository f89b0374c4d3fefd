//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → KicConfig (validated, immutable)
//!     → CLI overrides applied by the daemon, then validated again
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The counted line is fixed; it has no config entry

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ControlConfig, KicConfig, ObservabilityConfig, ShutdownConfig};
pub use validation::{validate_config, ValidationError};
