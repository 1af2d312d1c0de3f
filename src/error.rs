//! Error types for gamestore
//!
//! Every fallible library operation returns [`Result`]. The HTTP layer maps
//! errors to status codes through [`Error::status_code`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for gamestore operations
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Lookup Errors
    // ==========================================================================
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    // ==========================================================================
    // Document Errors
    // ==========================================================================
    #[error("Document '{id}' already exists in collection '{collection}'")]
    DocumentAlreadyExists { collection: String, id: String },

    #[error("Document '{id}' in collection '{collection}' is malformed: {message}")]
    MalformedDocument {
        collection: String,
        id: String,
        message: String,
    },

    // ==========================================================================
    // Git Errors
    // ==========================================================================
    #[error("Git operation failed: {message}")]
    GitError {
        message: String,
        #[source]
        source: Option<git2::Error>,
    },

    // ==========================================================================
    // IO Errors
    // ==========================================================================
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // Serialization Errors
    // ==========================================================================
    #[error("Failed to parse YAML: {message}")]
    YamlParseError { message: String },

    #[error("Failed to serialize to YAML: {message}")]
    YamlSerializeError { message: String },

    // ==========================================================================
    // Rendering Errors
    // ==========================================================================
    #[error("Template error: {message}")]
    TemplateError { message: String },

    // ==========================================================================
    // Catch-all
    // ==========================================================================
    #[error("{0}")]
    Other(String),
}

/// Result type alias for gamestore operations
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Conversions from external error types
// =============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::GitError {
            message: err.message().to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::YamlParseError {
            message: err.to_string(),
        }
    }
}

impl From<tera::Error> for Error {
    fn from(err: tera::Error) -> Self {
        // Tera keeps the useful part (which variable, which line) in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Error::TemplateError { message }
    }
}

impl From<crate::validation::IdentifierError> for Error {
    fn from(err: crate::validation::IdentifierError) -> Self {
        use crate::validation::IdentifierError;
        match err {
            IdentifierError::Empty => Error::InvalidIdentifier {
                kind: "identifier",
                value: String::new(),
                reason: "cannot be empty",
            },
            IdentifierError::TooLong(value) => Error::InvalidIdentifier {
                kind: "identifier",
                value,
                reason: "exceeds maximum length",
            },
            IdentifierError::InvalidCharacters(value) => Error::InvalidIdentifier {
                kind: "identifier",
                value,
                reason: "contains invalid characters",
            },
        }
    }
}

// =============================================================================
// Error Display Helpers
// =============================================================================

impl Error {
    /// Shorthand for a missing entity
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true if the error means "nothing lives at that identifier"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::InvalidIdentifier { .. }
        )
    }

    /// HTTP status code this error surfaces as
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else {
            500
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("Game", "abc123");
        assert_eq!(err.to_string(), "Game 'abc123' not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found("Genre", "x").status_code(), 404);
        let invalid: Error = crate::validation::IdentifierError::InvalidCharacters("..".into()).into();
        assert_eq!(invalid.status_code(), 404);
        assert_eq!(Error::Other("disk on fire".into()).status_code(), 500);
    }
}
