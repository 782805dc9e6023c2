//! # rever-connect
//!
//! Write side of rever: one [`TargetAdapter`] per target system and the
//! [`Reconciler`] that walks the catalog tree through them.
//!
//! This crate provides:
//!
//! - **Write Planning**: the decision policy, rendering and the content-equality short-circuit
//! - **Reconciler**: schema then table passes with gating and abort-on-failure
//! - **BigQuery**: dataset and column descriptions, Data Catalog table overviews
//! - **Glue**: database, table and column descriptions for Athena
//! - **Denodo**: VDP over VQL and the data catalog's local metadata over REST
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rever_connect::{Reconciler, glue::{AwsGlueClient, GlueAdapter}};
//!
//! let glue = AwsGlueClient::connect(glue_config).await;
//! let report = Reconciler::new(Arc::new(catalog_client), config)
//!     .with_adapter(Box::new(GlueAdapter::new(glue)))
//!     .with_container_depth(rever_connect::glue::CONTAINER_DEPTH)
//!     .run()
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod adapter;
pub mod bigquery;
pub mod denodo;
pub mod driver;
pub mod error;
pub mod glue;
mod http;
pub mod plan;

pub use adapter::{ColumnOutcome, TableReport, TableRequest, TargetAdapter};
pub use driver::{Reconciler, RunReport};
pub use error::{Error, Phase, Result, TargetError};
pub use plan::{Plan, UpdatePolicy, outcome_from_error, outcome_of, plan_update};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapter::{TableReport, TableRequest, TargetAdapter};
    pub use crate::driver::{Reconciler, RunReport};
    pub use crate::error::{Error, Phase, Result, TargetError};
    pub use crate::plan::{Plan, UpdatePolicy, plan_update};
}
