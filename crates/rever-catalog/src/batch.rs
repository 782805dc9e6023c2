//! Chunked batch fetching of child assets.

use crate::asset::CatalogAsset;
use crate::error::{CatalogError, Result};
use crate::source::CatalogSource;

/// Maximum number of IDs the catalog accepts in one request.
pub const MAX_IDS_PER_REQUEST: usize = 100;

/// Splits `ids` into consecutive slices of at most `size` IDs, preserving order.
///
/// A `size` of zero is treated as one.
#[must_use]
pub fn chunk_ids(ids: &[String], size: usize) -> Vec<&[String]> {
    ids.chunks(size.max(1)).collect()
}

/// Fetches the direct children of every parent, in parent order then child order.
///
/// One request is issued per chunk of [`MAX_IDS_PER_REQUEST`] IDs. The first
/// failing chunk aborts the whole fetch; no partial result is returned.
///
/// # Errors
///
/// Returns [`CatalogError::ChildFetch`] naming the parent whose chunk failed.
pub async fn fetch_children(
    source: &dyn CatalogSource,
    parents: &[CatalogAsset],
) -> Result<Vec<CatalogAsset>> {
    let mut children = Vec::new();
    for parent in parents {
        children.extend(fetch_children_of(source, parent).await?);
    }
    tracing::debug!(
        parents = parents.len(),
        children = children.len(),
        "fetched child assets"
    );
    Ok(children)
}

/// Fetches the direct children of a single asset.
///
/// # Errors
///
/// Returns [`CatalogError::ChildFetch`] if any chunk fails.
pub async fn fetch_children_of(
    source: &dyn CatalogSource,
    parent: &CatalogAsset,
) -> Result<Vec<CatalogAsset>> {
    let mut children = Vec::with_capacity(parent.child_asset_ids.len());
    for chunk in chunk_ids(&parent.child_asset_ids, MAX_IDS_PER_REQUEST) {
        let assets = source
            .assets_by_ids(chunk)
            .await
            .map_err(|e| CatalogError::ChildFetch {
                parent_id: parent.id.clone(),
                source: Box::new(e),
            })?;
        children.extend(assets);
    }
    Ok(children)
}
