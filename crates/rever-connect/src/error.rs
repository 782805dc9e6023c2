//! Error types for target systems and the reconciliation driver.
//!
//! [`TargetError`] is the only classified error in rever: each adapter maps
//! its vendor vocabulary (HTTP status, AWS error code, SQLSTATE) onto
//! [`ErrorKind`]. The driver turns a fatal outcome into [`Error::Aborted`].

use std::fmt;

use rever_core::ErrorKind;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A classified failure from a target system.
#[derive(Debug, thiserror::Error)]
#[error("{system} {kind}: {message}")]
pub struct TargetError {
    /// Target system name, e.g. `bigquery`.
    pub system: &'static str,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// Description of the failure.
    pub message: String,
    /// The underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TargetError {
    /// Creates a new target error.
    #[must_use]
    pub fn new(system: &'static str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            system,
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(system: &'static str, message: impl Into<String>) -> Self {
        Self::new(system, ErrorKind::NotFound, message)
    }

    /// Creates a permission-denied error.
    #[must_use]
    pub fn permission_denied(system: &'static str, message: impl Into<String>) -> Self {
        Self::new(system, ErrorKind::PermissionDenied, message)
    }

    /// Creates a malformed-response error.
    #[must_use]
    pub fn malformed(system: &'static str, message: impl Into<String>) -> Self {
        Self::new(system, ErrorKind::Malformed, message)
    }

    /// Creates an unclassified error.
    #[must_use]
    pub fn other(system: &'static str, message: impl Into<String>) -> Self {
        Self::new(system, ErrorKind::Other, message)
    }
}

/// Phase of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Reading the catalog hierarchy.
    AssembleTree,
    /// Writing schema descriptions.
    ReconcileSchemas,
    /// Writing table descriptions.
    ReconcileTables,
    /// Writing the column descriptions of one table.
    ReconcileColumns,
    /// Every entity was visited.
    Done,
    /// A fatal error stopped the run.
    Aborted,
}

impl Phase {
    /// Returns the snake_case name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssembleTree => "assemble_tree",
            Self::ReconcileSchemas => "reconcile_schemas",
            Self::ReconcileTables => "reconcile_tables",
            Self::ReconcileColumns => "reconcile_columns",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end a reconciliation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The catalog hierarchy could not be assembled.
    #[error("failed to assemble catalog hierarchy")]
    Catalog(#[from] rever_catalog::CatalogError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] rever_core::Error),

    /// An entity failed with a fatal error.
    #[error("{system} run aborted in {phase} at {entity}: {kind} error: {message}")]
    Aborted {
        /// Target system the failure came from.
        system: &'static str,
        /// Phase the run was in.
        phase: Phase,
        /// Entity being reconciled, e.g. `sales_db.orders`.
        entity: String,
        /// Classification of the failure.
        kind: ErrorKind,
        /// Description of the failure.
        message: String,
    },

    /// A connector could not be constructed.
    #[error("failed to set up {system} connector: {message}")]
    Setup {
        /// Target system name.
        system: &'static str,
        /// Description of the failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a setup error with a source cause.
    #[must_use]
    pub fn setup(
        system: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Setup {
            system,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the phase the run stopped in.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Catalog(_) | Self::Config(_) | Self::Setup { .. } => Phase::AssembleTree,
            Self::Aborted { phase, .. } => *phase,
        }
    }
}
