//! BigQuery connector.
//!
//! Dataset descriptions and top-level column descriptions live in BigQuery
//! itself; table descriptions are written as Data Catalog entry overviews.
//! The catalog tree has a project level above the datasets.

mod adapter;
mod auth;
mod client;

pub use adapter::BigQueryAdapter;
pub use auth::{GcpTokenSource, StaticToken, TokenSource};
pub use client::{
    BigQueryClient, BigQueryConfig, BusinessContext, Dataset, Entry, EntryOverview, Table,
    TableField, TableSchema,
};

/// System name used in logs and errors.
pub const SYSTEM: &str = "bigquery";

/// Container levels between the catalog roots (projects) and datasets.
pub const CONTAINER_DEPTH: usize = 1;

/// Environment variable holding the service account JSON.
pub const CREDENTIALS_ENV: &str = "GOOGLE_CLOUD_SERVICE_ACCOUNT_CREDENTIALS";
