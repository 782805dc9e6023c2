//! Error types and result aliases for rever.
//!
//! This module defines the shared error type used across all rever components,
//! and the [`ErrorKind`] taxonomy that connectors classify vendor failures into
//! so the driver can decide between skip-and-continue and abort.

use std::fmt;

/// The result type used throughout rever.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failure, shared by every target system.
///
/// Transient transport failures (rate limiting, 5xx) are retried inside the
/// transports and never reach this taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The object exists in the catalog but not in the live system.
    NotFound,
    /// The configured identity may not read or write the object.
    PermissionDenied,
    /// A response did not have the expected shape.
    Malformed,
    /// Any other failure.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Malformed => "malformed",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Errors that can occur in rever operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration was missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_display_in_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::PermissionDenied.to_string(), "permission_denied");
    }

    #[test]
    fn configuration_error_display() {
        let err = Error::configuration("missing base url");
        assert_eq!(err.to_string(), "configuration error: missing base url");
    }
}
