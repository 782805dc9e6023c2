//! Observability infrastructure for rever.
//!
//! Structured logging with consistent spans. A reconciliation run opens one
//! [`reconcile_span`] per phase and one [`entity_span`] per catalog entity, so
//! every decision and write in the log carries the system, phase and entity.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            ))),
        }
    }
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// `default_directive` is used when `RUST_LOG` is unset (e.g. `info` or the
/// value of `LOG_LEVEL`).
///
/// # Example
///
/// ```rust
/// use rever_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty, "info");
/// ```
pub fn init_logging(format: LogFormat, default_directive: &str) {
    INIT.call_once(|| {
        if let Err(e) = install_subscriber(format, default_directive) {
            tracing::debug!(error = %e, "global subscriber already installed; keeping it");
        }
    });
}

fn install_subscriber(
    format: LogFormat,
    default_directive: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tfmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tfmt::layer().pretty())
            .try_init(),
    }
}

/// Creates a span for one phase of a reconciliation run.
///
/// # Example
///
/// ```rust
/// use rever_core::observability::reconcile_span;
///
/// let span = reconcile_span("bigquery", "reconcile_schemas");
/// let _guard = span.enter();
/// ```
#[must_use]
pub fn reconcile_span(system: &str, phase: &str) -> Span {
    tracing::info_span!("reconcile", system = system, phase = phase)
}

/// Creates a span for a single entity (schema, table or column).
#[must_use]
pub fn entity_span(level: &str, name: &str) -> Span {
    tracing::debug_span!("entity", level = level, name = name)
}

// ============================================================================
// Secret handling
// ============================================================================

/// Wrapper that hides its value from `Debug` and `Display` output.
///
/// Used for client secrets and passwords that live inside configuration
/// structs which are logged at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Redacted<T>(T);

impl<T> Redacted<T> {
    /// Wraps a secret value.
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the wrapped secret.
    pub const fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Redacted<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
