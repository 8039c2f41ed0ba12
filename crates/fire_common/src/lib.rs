//! Common errors and constants for firebrowse
//!
//! This crate provides the error taxonomy and process-level constants shared by
//! every firebrowse component.

pub mod sanitizer;
pub mod telemetry;

use thiserror::Error;

/// Core error types for firebrowse operations
///
/// Variants fall into two families. Configuration errors stop the program
/// before any network activity; data access errors surface from the fetch and
/// count round-trips. See [`FireError::is_configuration`].
#[derive(Error, Debug)]
pub enum FireError {
    #[error("{0} environment variable is required")]
    MissingEnv(String),

    #[error("Failed to read credentials file {path}: {source}")]
    CredentialsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credentials file: {0}")]
    CredentialsParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid collection path '{path}': {reason}")]
    InvalidCollectionPath { path: String, reason: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response from Firestore: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl FireError {
    /// True for errors raised while loading configuration or credentials.
    ///
    /// These are fatal and map to [`EXIT_ERROR`]. Everything else is a data
    /// access error, reported without changing the exit code.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FireError::MissingEnv(_)
                | FireError::CredentialsRead { .. }
                | FireError::CredentialsParse(_)
                | FireError::ConfigError(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FireError>;

/// Exit code constants
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_message() {
        let err = FireError::MissingEnv("GOOGLE_APPLICATION_CREDENTIALS".to_string());
        assert_eq!(
            err.to_string(),
            "GOOGLE_APPLICATION_CREDENTIALS environment variable is required"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_api_error_message() {
        let err = FireError::Api {
            status: 403,
            code: "PERMISSION_DENIED".to_string(),
            message: "Missing or insufficient permissions.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "403 PERMISSION_DENIED: Missing or insufficient permissions."
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_classification() {
        assert!(FireError::CredentialsParse("bad".into()).is_configuration());
        assert!(FireError::ConfigError("bad".into()).is_configuration());
        assert!(!FireError::Network("down".into()).is_configuration());
        assert!(!FireError::Decode("garbage".into()).is_configuration());
        assert!(!FireError::Auth("rejected".into()).is_configuration());
    }
}
