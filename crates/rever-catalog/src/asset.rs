//! Asset data model for the catalog.
//!
//! A [`CatalogAsset`] is one node in the catalog tree. Its depth is given by
//! `object_type`, and its ancestors are listed in `path`, each tagged with a
//! path layer (see [`layer`]).
//!
//! Wire field names are snake_case. Unknown fields are ignored, and missing or
//! `null` fields take their default value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Path layer labels used in [`CatalogAsset::path`].
pub mod layer {
    /// Top-level container (BigQuery project, Athena account).
    pub const SCHEMA4: &str = "schema4";
    /// Database, dataset or schema.
    pub const SCHEMA3: &str = "schema3";
    /// Table or view.
    pub const TABLE: &str = "table";
    /// Column or field.
    pub const COLUMN: &str = "column";
}

/// Object types used when listing assets.
pub mod object_type {
    /// Root-level assets are listed with this type.
    pub const SCHEMA: &str = "schema";
    /// Table-level assets.
    pub const TABLE: &str = "table";
    /// Column-level assets.
    pub const COLUMN: &str = "column";
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Reference to an ancestor of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Layer label, e.g. `schema3`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_layer: String,
    /// Catalog ID of the ancestor.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Object type of the ancestor.
    #[serde(default, deserialize_with = "null_as_default")]
    pub object_type: String,
    /// Physical name of the ancestor.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Tag assignment on an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    /// Tag group.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_group_id: String,
    /// Parent tag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_tag_id: String,
    /// Child tag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub child_tag_id: String,
}

/// One node in the catalog tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAsset {
    /// Opaque identifier, stable across runs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Secondary identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_id: String,
    /// Object type, e.g. `schema`, `table` or `column`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub object_type: String,
    /// Originating system tag, e.g. `bigquery`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub service_name: String,
    /// Name in the source system.
    #[serde(default, deserialize_with = "null_as_default")]
    pub physical_name: String,
    /// Business name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logical_name: String,
    /// The description propagated to target systems.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Comment captured from the source DDL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_on_ddl: String,
    /// Column data type.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_type: String,
    /// Column position within its table.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordinal_position: i64,
    /// Identity that created the catalog entry.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: String,
    /// Identities that edited the entry.
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_by: Vec<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Archived in the catalog.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_archived: bool,
    /// Imported from CSV rather than crawled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_csv_imported: bool,
    /// The catalog believes the object no longer exists in the source.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_lost: bool,
    /// Ancestors, one entry per layer.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<PathEntry>,
    /// Direct children, in catalog order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub child_asset_ids: Vec<String>,
    /// Rule-assigned tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rule_tag_ids: Vec<TagRef>,
    /// Manually assigned tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub manual_tag_ids: Vec<TagRef>,
}

impl CatalogAsset {
    /// Returns the ancestor at `path_layer`, or `None` if the path has no such layer.
    #[must_use]
    pub fn ancestor(&self, path_layer: &str) -> Option<&PathEntry> {
        self.path.iter().find(|p| p.path_layer == path_layer)
    }

    /// Returns the name of the ancestor at `path_layer`, or `""` when absent.
    #[must_use]
    pub fn ancestor_name(&self, path_layer: &str) -> &str {
        self.ancestor(path_layer).map_or("", |p| p.name.as_str())
    }

    /// Returns true if the asset carries a non-empty description.
    #[must_use]
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}
