//! Test catalog with request tracing and failure injection.
//!
//! Wraps an [`InMemoryCatalog`] and records every request for assertions on
//! pagination and chunking behaviour.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rever_catalog::memory::InMemoryCatalog;
use rever_catalog::{AssetPage, CatalogAsset, CatalogError, CatalogSource};

/// Record of a catalog request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    /// Type-scoped listing.
    ByType {
        /// Object type listed.
        object_type: String,
        /// Cursor sent with the request.
        last_id: String,
    },
    /// ID lookup.
    ByIds {
        /// IDs requested, in order.
        ids: Vec<String>,
    },
}

/// In-memory catalog that records requests.
#[derive(Debug, Clone, Default)]
pub struct RecordingCatalog {
    inner: Arc<InMemoryCatalog>,
    requests: Arc<Mutex<Vec<CatalogRequest>>>,
    fail_cursors: Arc<Mutex<Vec<String>>>,
    fail_ids: Arc<Mutex<Vec<String>>>,
}

impl RecordingCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wrapped in-memory catalog for scripting pages and assets.
    #[must_use]
    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.inner
    }

    /// Appends a root listing page (object type `schema`).
    pub fn push_root_page(&self, data: Vec<CatalogAsset>, next_cursor: &str) {
        self.inner
            .push_page(rever_catalog::asset::object_type::SCHEMA, data, next_cursor);
    }

    /// Makes assets available to ID lookups.
    pub fn insert_all(&self, assets: impl IntoIterator<Item = CatalogAsset>) {
        self.inner.insert_all(assets);
    }

    /// Returns all recorded requests.
    pub fn requests(&self) -> Vec<CatalogRequest> {
        self.requests.lock().expect("lock").clone()
    }

    /// Returns the ID batches requested, in order.
    pub fn id_batches(&self) -> Vec<Vec<String>> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                CatalogRequest::ByIds { ids } => Some(ids),
                CatalogRequest::ByType { .. } => None,
            })
            .collect()
    }

    /// Returns the cursors sent to the listing endpoint, in order.
    pub fn cursors(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                CatalogRequest::ByType { last_id, .. } => Some(last_id),
                CatalogRequest::ByIds { .. } => None,
            })
            .collect()
    }

    /// Clears recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().expect("lock").clear();
    }

    /// Makes listing requests carrying `cursor` fail.
    pub fn fail_on_cursor(&self, cursor: impl Into<String>) {
        self.fail_cursors.lock().expect("lock").push(cursor.into());
    }

    /// Makes ID lookups that include `id` fail.
    pub fn fail_on_id(&self, id: impl Into<String>) {
        self.fail_ids.lock().expect("lock").push(id.into());
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        self.fail_cursors.lock().expect("lock").clear();
        self.fail_ids.lock().expect("lock").clear();
    }
}

#[async_trait]
impl CatalogSource for RecordingCatalog {
    async fn assets_by_type(
        &self,
        object_type: &str,
        last_id: &str,
    ) -> rever_catalog::Result<AssetPage> {
        self.requests.lock().expect("lock").push(CatalogRequest::ByType {
            object_type: object_type.to_string(),
            last_id: last_id.to_string(),
        });
        let fail = self
            .fail_cursors
            .lock()
            .expect("lock")
            .iter()
            .any(|c| c == last_id);
        if fail {
            return Err(CatalogError::Injected {
                message: format!("listing at cursor '{last_id}'"),
            });
        }
        self.inner.assets_by_type(object_type, last_id).await
    }

    async fn assets_by_ids(&self, ids: &[String]) -> rever_catalog::Result<Vec<CatalogAsset>> {
        self.requests.lock().expect("lock").push(CatalogRequest::ByIds { ids: ids.to_vec() });
        let failing = self
            .fail_ids
            .lock()
            .expect("lock")
            .iter()
            .find(|f| ids.contains(*f))
            .cloned();
        if let Some(id) = failing {
            return Err(CatalogError::Injected {
                message: format!("lookup of id '{id}'"),
            });
        }
        self.inner.assets_by_ids(ids).await
    }
}
