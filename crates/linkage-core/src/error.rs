//! Error types for linkage-core
//!
//! Only programming and configuration mistakes are errors. Data problems
//! (missing fields, stale focus ids, zero-area brushes) degrade silently and
//! are reported through `tracing` instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for linkage operations
#[derive(Error, Debug)]
pub enum LinkageError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Brush or view registration errors
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Predicate text could not be parsed
    #[error("Predicate error: {0}")]
    Predicate(#[from] linkage_selection::ParseError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range or inconsistent
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors related to brush groups, brushes and view bindings
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// A brush was registered in two different groups
    #[error("Brush '{brush}' is already in group '{existing}', cannot join '{requested}'")]
    ConflictingGroups {
        brush: String,
        existing: String,
        requested: String,
    },

    /// A brush was registered again with a different kind
    #[error("Brush '{brush}' is already registered with a different kind")]
    ConflictingKind { brush: String },

    /// A group was defined twice with different modes
    #[error("Group '{0}' is already defined with a different mode")]
    ConflictingGroupMode(String),

    /// A brush names a group that was never defined
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    /// An event targets a brush that was never registered
    #[error("Unknown brush: {0}")]
    UnknownBrush(String),

    /// An extent of the wrong shape was sent to a brush
    #[error("Brush '{brush}' does not accept a {extent} extent")]
    ExtentMismatch { brush: String, extent: &'static str },

    /// A view id is already bound
    #[error("View already registered: {0}")]
    DuplicateView(String),

    /// A view id is not bound
    #[error("Unknown view: {0}")]
    UnknownView(String),
}

/// Result type alias for linkage operations
pub type LinkageResult<T> = Result<T, LinkageError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for registrations
pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_groups_display() {
        let err = RegistrationError::ConflictingGroups {
            brush: "b1".to_string(),
            existing: "scatter".to_string(),
            requested: "bars".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("b1"));
        assert!(text.contains("scatter"));
        assert!(text.contains("bars"));
    }

    #[test]
    fn test_registration_wraps() {
        let err: LinkageError = RegistrationError::UnknownView("v".to_string()).into();
        assert!(err.to_string().contains("Unknown view: v"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: "lens.radius".to_string(),
            message: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("lens.radius"));
    }
}
