//! # rever-catalog
//!
//! Read side of rever: the catalog's asset model, its HTTP client, and the
//! assembler that turns the catalog's paginated, ID-batched API into flat
//! schema, table and column collections.
//!
//! This crate provides:
//!
//! - **Asset Model**: [`CatalogAsset`] with ancestor lookup by path layer
//! - **Catalog Client**: OAuth2-authenticated client with retry
//! - **Batch Fetcher**: child lookups in chunks of at most 100 IDs
//! - **Hierarchy Assembler**: cursor pagination over roots, then children per level
//! - **Indexed Lookup**: assets keyed by catalog ID or physical name
//!
//! ## Example
//!
//! ```rust,ignore
//! use rever_catalog::{assemble_tree, AssembleOptions, CatalogClient, CatalogClientConfig};
//!
//! let client = CatalogClient::new(CatalogClientConfig::new(base_url, id, secret))?;
//! let mut options = AssembleOptions::new("bigquery");
//! options.container_depth = 1;
//! let tree = assemble_tree(&client, &options).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod asset;
pub mod batch;
pub mod client;
pub mod error;
pub mod hierarchy;
pub mod memory;
pub mod source;

// Re-export main types at crate root
pub use asset::{CatalogAsset, PathEntry, TagRef, layer};
pub use batch::{MAX_IDS_PER_REQUEST, chunk_ids, fetch_children, fetch_children_of};
pub use client::{CatalogClient, CatalogClientConfig};
pub use error::{CatalogError, Result};
pub use hierarchy::{
    AssembleOptions, AssetIndex, AssetTree, IndexStrategy, assemble_tree, fetch_root_assets,
};
pub use source::{AssetPage, CatalogSource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::asset::{CatalogAsset, PathEntry, layer};
    pub use crate::error::{CatalogError, Result};
    pub use crate::hierarchy::{AssembleOptions, AssetTree, IndexStrategy, assemble_tree};
    pub use crate::source::{AssetPage, CatalogSource};
}
