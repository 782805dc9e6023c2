//! Hierarchy assembly: roots, schemas, tables and columns.
//!
//! Roots are listed with cursor pagination and filtered by service and
//! creator. Each lower level is fetched through [`fetch_children`]. Systems
//! with a container layer above schemas (BigQuery projects, Athena accounts)
//! descend `container_depth` levels before reaching schemas.

use std::collections::HashMap;

use crate::asset::{CatalogAsset, object_type};
use crate::batch::fetch_children;
use crate::error::{CatalogError, Result};
use crate::source::CatalogSource;

/// Options for [`assemble_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Root assets must have this `service_name`.
    pub service: String,
    /// Root assets must have this `created_by`, when set and non-empty.
    pub created_by: Option<String>,
    /// Levels between the roots and the schemas.
    pub container_depth: usize,
    /// Schemas whose physical name is not listed are dropped, when set.
    pub allow_list: Option<Vec<String>>,
}

impl AssembleOptions {
    /// Creates options for `service` with no filters and no container level.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    fn accepts_root(&self, asset: &CatalogAsset) -> bool {
        if asset.service_name != self.service {
            return false;
        }
        match self.created_by.as_deref() {
            None | Some("") => true,
            Some(creator) => asset.created_by == creator,
        }
    }

    fn accepts_schema(&self, asset: &CatalogAsset) -> bool {
        self.allow_list
            .as_ref()
            .is_none_or(|list| list.iter().any(|name| *name == asset.physical_name))
    }
}

/// Lists every root asset of `service`, following the cursor until it is empty.
///
/// # Errors
///
/// Returns [`CatalogError::Pagination`] carrying the cursor of the failing request.
pub async fn fetch_root_assets(
    source: &dyn CatalogSource,
    options: &AssembleOptions,
) -> Result<Vec<CatalogAsset>> {
    let mut roots = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = source
            .assets_by_type(object_type::SCHEMA, &cursor)
            .await
            .map_err(|e| CatalogError::Pagination {
                object_type: object_type::SCHEMA.to_string(),
                cursor: cursor.clone(),
                source: Box::new(e),
            })?;
        let done = page.is_last();
        roots.extend(page.data.into_iter().filter(|a| options.accepts_root(a)));
        if done {
            return Ok(roots);
        }
        tracing::debug!(cursor = %page.last_id, "root asset listing continues");
        cursor = page.last_id;
    }
}

/// The assembled hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTree {
    /// Schema-level assets (datasets, databases).
    pub schemas: Vec<CatalogAsset>,
    /// Table-level assets.
    pub tables: Vec<CatalogAsset>,
    /// Column-level assets.
    pub columns: Vec<CatalogAsset>,
}

/// Builds the schema, table and column collections for a service.
///
/// # Errors
///
/// Propagates the first listing or fetch error, unclassified.
pub async fn assemble_tree(
    source: &dyn CatalogSource,
    options: &AssembleOptions,
) -> Result<AssetTree> {
    let mut schemas = fetch_root_assets(source, options).await?;
    tracing::info!(service = %options.service, roots = schemas.len(), "listed root assets");

    for _ in 0..options.container_depth {
        schemas = fetch_children(source, &schemas).await?;
    }
    schemas.retain(|s| options.accepts_schema(s));
    tracing::info!(schemas = schemas.len(), "assembled schema assets");

    let tables = fetch_children(source, &schemas).await?;
    tracing::info!(tables = tables.len(), "assembled table assets");

    let columns = fetch_children(source, &tables).await?;
    tracing::info!(columns = columns.len(), "assembled column assets");

    Ok(AssetTree {
        schemas,
        tables,
        columns,
    })
}

/// How an adapter addresses entities in its target system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IndexStrategy {
    /// By catalog ID.
    #[default]
    ById,
    /// By physical name.
    ByPhysicalName,
}

impl IndexStrategy {
    fn key<'a>(self, asset: &'a CatalogAsset) -> &'a str {
        match self {
            Self::ById => &asset.id,
            Self::ByPhysicalName => &asset.physical_name,
        }
    }
}

/// Lookup map over a set of assets.
///
/// With [`IndexStrategy::ByPhysicalName`] duplicate names resolve to the
/// last asset inserted.
#[derive(Debug, Clone)]
pub struct AssetIndex<'a> {
    entries: HashMap<&'a str, &'a CatalogAsset>,
}

impl<'a> AssetIndex<'a> {
    /// Indexes `assets` by `strategy`.
    #[must_use]
    pub fn build(strategy: IndexStrategy, assets: impl IntoIterator<Item = &'a CatalogAsset>) -> Self {
        let entries = assets
            .into_iter()
            .map(|asset| (strategy.key(asset), asset))
            .collect();
        Self { entries }
    }

    /// Returns the asset for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a CatalogAsset> {
        self.entries.get(key).copied()
    }
}

impl AssetTree {
    /// Indexes the columns by `strategy`.
    #[must_use]
    pub fn index(&self, strategy: IndexStrategy) -> AssetIndex<'_> {
        AssetIndex::build(strategy, &self.columns)
    }

    /// Groups columns under their tables, in table order.
    ///
    /// Columns follow `child_asset_ids` order; IDs with no fetched column
    /// are left out.
    #[must_use]
    pub fn columns_by_table(&self) -> Vec<(&CatalogAsset, Vec<&CatalogAsset>)> {
        let by_id = self.index(IndexStrategy::ById);
        self.tables
            .iter()
            .map(|table| {
                let columns = table
                    .child_asset_ids
                    .iter()
                    .filter_map(|id| by_id.get(id))
                    .collect();
                (table, columns)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, name: &str) -> CatalogAsset {
        CatalogAsset {
            id: id.into(),
            physical_name: name.into(),
            ..CatalogAsset::default()
        }
    }

    #[test]
    fn root_filter_applies_service_and_creator() {
        let mut options = AssembleOptions::new("denodo");
        let mut a = asset("1", "a");
        a.service_name = "denodo".into();
        a.created_by = "agent".into();
        let mut b = a.clone();
        b.service_name = "bigquery".into();

        assert!(options.accepts_root(&a));
        assert!(!options.accepts_root(&b));

        options.created_by = Some("someone-else".into());
        assert!(!options.accepts_root(&a));
        options.created_by = Some(String::new());
        assert!(options.accepts_root(&a));
    }

    #[test]
    fn index_by_name_and_id() {
        let assets = vec![asset("c1", "amount"), asset("c2", "currency")];
        let by_id = AssetIndex::build(IndexStrategy::ById, &assets);
        let by_name = AssetIndex::build(IndexStrategy::ByPhysicalName, &assets);
        assert_eq!(by_id.get("c2").unwrap().physical_name, "currency");
        assert_eq!(by_name.get("amount").unwrap().id, "c1");
        assert!(by_name.get("c1").is_none());
    }

    #[test]
    fn columns_follow_child_order() {
        let mut table = asset("t1", "orders");
        table.child_asset_ids = vec!["c2".into(), "missing".into(), "c1".into()];
        let tree = AssetTree {
            schemas: vec![],
            tables: vec![table],
            columns: vec![asset("c1", "amount"), asset("c2", "currency")],
        };
        let grouped = tree.columns_by_table();
        let names: Vec<&str> = grouped[0]
            .1
            .iter()
            .map(|c| c.physical_name.as_str())
            .collect();
        assert_eq!(grouped[0].0.id, "t1");
        assert_eq!(names, vec!["currency", "amount"]);
    }
}
