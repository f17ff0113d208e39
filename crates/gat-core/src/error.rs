//! Unified error types for the protection workspace
//!
//! The simulation core itself never fails for in-domain input; errors only
//! surface at the boundaries: reading topology/config files, validating a
//! caller-supplied fault scenario, or building a coordinator from an
//! inconsistent topology.
//!
//! # Example
//!
//! ```
//! use gat_core::{FaultScenario, FaultType, GatError, GatResult};
//!
//! fn parse(bus: usize, kind: &str, severity: f64) -> GatResult<FaultScenario> {
//!     let fault_type: FaultType = kind.parse()?;
//!     FaultScenario::validated(bus, fault_type, severity)
//! }
//!
//! assert!(parse(4, "3ph", 0.8).is_ok());
//! assert!(matches!(parse(4, "5ph", 0.8), Err(GatError::Parse(_))));
//! assert!(matches!(parse(4, "3ph", 1.5), Err(GatError::Validation(_))));
//! ```

use thiserror::Error;

/// Unified error type for all GAT protection operations.
#[derive(Error, Debug)]
pub enum GatError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Caller input outside the accepted domain (severity, bus, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Zone/device topology errors
    #[error("Topology error: {0}")]
    Topology(String),
}

/// Convenience type alias for Results using GatError.
pub type GatResult<T> = Result<T, GatError>;

impl From<serde_json::Error> for GatError {
    fn from(err: serde_json::Error) -> Self {
        GatError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for GatError {
    fn from(err: toml::de::Error) -> Self {
        GatError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatError::Topology("bus 5 claimed by Z1 and Z2".into());
        assert!(err.to_string().contains("Topology error"));
        assert!(err.to_string().contains("bus 5"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let gat_err: GatError = io_err.into();
        assert!(matches!(gat_err, GatError::Io(_)));
    }

    #[test]
    fn test_toml_error_is_parse() {
        let err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let gat_err: GatError = err.into();
        assert!(matches!(gat_err, GatError::Parse(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> GatResult<()> {
            Err(GatError::Validation("severity out of range".into()))
        }

        fn outer() -> GatResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
