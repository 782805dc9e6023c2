//! The catalog read seam.
//!
//! [`CatalogSource`] abstracts the two catalog endpoints the assembler needs.
//! [`crate::client::CatalogClient`] implements it over HTTP, and
//! [`crate::memory::InMemoryCatalog`] implements it for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::CatalogAsset;
use crate::error::Result;

/// One page of a type-scoped listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPage {
    /// Assets on this page.
    #[serde(default)]
    pub data: Vec<CatalogAsset>,
    /// Continuation cursor; empty when the listing is complete.
    #[serde(default)]
    pub last_id: String,
}

impl AssetPage {
    /// Returns true if this is the final page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.last_id.is_empty()
    }
}

/// Read access to the catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Lists assets of `object_type`, starting after `last_id` (empty for the first page).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    async fn assets_by_type(&self, object_type: &str, last_id: &str) -> Result<AssetPage>;

    /// Fetches assets by ID. Callers send at most
    /// [`MAX_IDS_PER_REQUEST`](crate::batch::MAX_IDS_PER_REQUEST) IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    async fn assets_by_ids(&self, ids: &[String]) -> Result<Vec<CatalogAsset>>;
}
