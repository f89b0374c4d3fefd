//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate values serde cannot check (paths, levels, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: KicConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::KicConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &KicConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let socket = &config.control.socket_path;
    if socket.as_os_str().is_empty() {
        errors.push(ValidationError {
            field: "control.socket_path",
            message: "must not be empty".to_string(),
        });
    } else if socket.file_name().is_none() {
        errors.push(ValidationError {
            field: "control.socket_path",
            message: format!("{} does not name a file", socket.display()),
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!(
                "unknown level {:?}, expected one of {}",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "{:?} is not a socket address",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&KicConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = KicConfig::default();
        config.control.socket_path = PathBuf::new();
        config.observability.log_level = "loud".to_string();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "control.socket_path",
                "observability.log_level",
                "observability.metrics_address"
            ]
        );
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = KicConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn root_is_not_a_socket_path() {
        let mut config = KicConfig::default();
        config.control.socket_path = PathBuf::from("/");
        assert!(validate_config(&config).is_err());
    }
}
