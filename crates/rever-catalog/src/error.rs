//! Error types for rever-catalog operations.
//!
//! The catalog layer never classifies failures: every error propagates upward
//! unchanged, wrapped with the cursor or parent asset that was being fetched.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The HTTP request could not be sent or its body not read.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The catalog API answered with a non-success status.
    #[error("catalog API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The access token could not be obtained.
    #[error("authentication failed: {message}")]
    Auth {
        /// Description of the failure.
        message: String,
    },

    /// A response did not have the expected shape.
    #[error("malformed response: {message}")]
    Malformed {
        /// Description of the problem.
        message: String,
    },

    /// Listing root assets failed at a cursor.
    #[error("failed to list {object_type} assets at cursor '{cursor}'")]
    Pagination {
        /// Object type being listed.
        object_type: String,
        /// Cursor that was sent with the failing request.
        cursor: String,
        /// The underlying failure.
        #[source]
        source: Box<CatalogError>,
    },

    /// Fetching the children of an asset failed.
    #[error("failed to fetch children of asset {parent_id}")]
    ChildFetch {
        /// Parent asset whose children were being fetched.
        parent_id: String,
        /// The underlying failure.
        #[source]
        source: Box<CatalogError>,
    },

    /// An injected failure from a test double.
    #[error("injected failure: {message}")]
    Injected {
        /// Description of the injected failure.
        message: String,
    },
}

impl CatalogError {
    /// Creates a transport error with a source cause.
    #[must_use]
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a malformed-response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns true if retrying the request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => rever_core::retry::is_transient_status(*status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Malformed {
                message: e.to_string(),
            };
        }
        Self::Transport {
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}
