//! In-memory catalog implementation for testing.
//!
//! This module provides [`InMemoryCatalog`], an implementation of the
//! [`CatalogSource`] trait backed by scripted listing pages and an asset map.
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: No persistence, no network
//! - **Pages are scripted**: the listing returns pages in insertion order,
//!   keyed by the cursor of the previous page

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::asset::CatalogAsset;
use crate::error::{CatalogError, Result};
use crate::source::{AssetPage, CatalogSource};

#[derive(Debug, Default)]
struct CatalogState {
    /// Listing pages per object type, keyed by the cursor that requests them.
    pages: HashMap<String, HashMap<String, AssetPage>>,
    /// Last cursor handed out per object type while scripting.
    tail_cursor: HashMap<String, String>,
    assets: HashMap<String, CatalogAsset>,
}

/// In-memory catalog for testing.
///
/// ## Example
///
/// ```rust
/// use rever_catalog::memory::InMemoryCatalog;
/// use rever_catalog::CatalogAsset;
///
/// let catalog = InMemoryCatalog::new();
/// catalog.push_page("schema", vec![CatalogAsset::default()], "");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

fn poison_err<T>(_: PoisonError<T>) -> CatalogError {
    CatalogError::Injected {
        message: "in-memory catalog lock poisoned".into(),
    }
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listing page for `object_type`.
    ///
    /// The first page answers the empty cursor; each following page answers
    /// the `next_cursor` of the page before it. Pushed assets are also made
    /// available by ID.
    pub fn push_page(&self, object_type: &str, data: Vec<CatalogAsset>, next_cursor: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let request_cursor = state
            .tail_cursor
            .insert(object_type.to_string(), next_cursor.to_string())
            .unwrap_or_default();
        for asset in &data {
            state.assets.insert(asset.id.clone(), asset.clone());
        }
        state.pages.entry(object_type.to_string()).or_default().insert(
            request_cursor,
            AssetPage {
                data,
                last_id: next_cursor.to_string(),
            },
        );
    }

    /// Makes `asset` available to ID lookups.
    pub fn insert(&self, asset: CatalogAsset) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.assets.insert(asset.id.clone(), asset);
    }

    /// Makes every asset available to ID lookups.
    pub fn insert_all(&self, assets: impl IntoIterator<Item = CatalogAsset>) {
        for asset in assets {
            self.insert(asset);
        }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn assets_by_type(&self, object_type: &str, last_id: &str) -> Result<AssetPage> {
        let state = self.state.read().map_err(poison_err)?;
        Ok(state
            .pages
            .get(object_type)
            .and_then(|pages| pages.get(last_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn assets_by_ids(&self, ids: &[String]) -> Result<Vec<CatalogAsset>> {
        let state = self.state.read().map_err(poison_err)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.assets.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str) -> CatalogAsset {
        CatalogAsset {
            id: id.into(),
            ..CatalogAsset::default()
        }
    }

    #[tokio::test]
    async fn pages_chain_by_cursor() {
        let catalog = InMemoryCatalog::new();
        catalog.push_page("schema", vec![asset("a")], "c1");
        catalog.push_page("schema", vec![asset("b")], "");

        let first = catalog.assets_by_type("schema", "").await.unwrap();
        assert_eq!(first.last_id, "c1");
        let second = catalog.assets_by_type("schema", "c1").await.unwrap();
        assert!(second.is_last());
        assert_eq!(second.data[0].id, "b");
    }

    #[tokio::test]
    async fn unknown_ids_are_omitted() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(asset("x"));
        let found = catalog
            .assets_by_ids(&["x".to_string(), "y".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
