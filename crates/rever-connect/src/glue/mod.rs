//! Athena connector over the Glue Data Catalog.
//!
//! Databases are matched by name against a paginated `GetDatabases`
//! listing. A table description and its column comments go out in a single
//! `UpdateTable` whose input copies the live table. Glue strings are
//! optional, so an unset description is distinct from an empty one.

mod adapter;
mod client;
mod convert;
pub mod memory;

pub use adapter::GlueAdapter;
pub use client::{AwsGlueClient, DatabasePage, GlueCatalog, GlueClientConfig, classify_sdk_error};
pub use convert::{database_input, table_input};

/// System name used in logs and errors.
pub const SYSTEM: &str = "glue";

/// Container levels between the catalog roots (accounts) and databases.
pub const CONTAINER_DEPTH: usize = 1;

/// Region the Glue catalog lives in unless configured otherwise.
pub const DEFAULT_REGION: &str = "ap-northeast-1";
