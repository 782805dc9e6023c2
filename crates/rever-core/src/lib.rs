//! # rever-core
//!
//! Core abstractions for rever, the agent that writes catalog descriptions back
//! into the native metadata stores of data systems.
//!
//! This crate provides the foundational types used across all rever components:
//!
//! - **Decision Policy**: the pure rule deciding whether a description is written
//! - **Prefix Marker**: how agent-written text is recognised on the next run
//! - **Configuration**: the explicit run configuration passed to the driver
//! - **Outcomes**: per-entity results and the run summary
//! - **Error Types**: shared error definitions and the failure taxonomy
//! - **Retry**: bounded backoff used by every transport
//!
//! ## Crate Boundary
//!
//! `rever-core` is the **only** crate allowed to define shared primitives.
//! It performs no I/O apart from sleeping between retries.
//!
//! ## Example
//!
//! ```rust
//! use rever_core::prelude::*;
//!
//! let prefix = PrefixMarker::default();
//! let write = should_update(
//!     OverwriteMode::IfEmpty,
//!     &prefix,
//!     TargetDescription::Present("user text"),
//!     "catalog text",
//! );
//! assert!(!write);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod decision;
pub mod error;
pub mod marker;
pub mod names;
pub mod observability;
pub mod outcome;
pub mod retry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use rever_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{OverwriteMode, ReconcileConfig};
    pub use crate::decision::{TargetDescription, should_update};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::marker::{DescriptionFormat, PrefixMarker, render_description};
    pub use crate::outcome::{EntityLevel, RunSummary, SkipReason, UpdateOutcome};
    pub use crate::retry::RetryPolicy;
}

pub use config::{OverwriteMode, ReconcileConfig};
pub use decision::{TargetDescription, should_update};
pub use error::{Error, ErrorKind, Result};
pub use marker::{DEFAULT_PREFIX, DescriptionFormat, PrefixMarker, render_description};
pub use observability::{LogFormat, Redacted, init_logging};
pub use outcome::{EntityLevel, LevelCounts, RunSummary, SkipReason, UpdateOutcome};
pub use retry::RetryPolicy;
