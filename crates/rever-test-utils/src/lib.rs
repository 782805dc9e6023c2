//! Shared test utilities for rever integration tests.
//!
//! This crate provides:
//! - [`RecordingCatalog`]: In-memory catalog with request recording and failure injection
//! - [`SalesFixture`] and [`AssetBuilder`]: catalog test data with consistent paths
//! - Custom assertion helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use rever_test_utils::{RecordingCatalog, SalesFixture};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let catalog = RecordingCatalog::new();
//!     SalesFixture::new("denodo", false).load_into(&catalog);
//!     // ... run test ...
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod assertions;
pub mod catalog;
pub mod fixtures;

pub use assertions::*;
pub use catalog::*;
pub use fixtures::*;

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rever=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
