//! Pre-built test fixtures for common test scenarios.
//!
//! Provides builders for catalog assets with consistent paths, and a small
//! `sales_db` hierarchy used across connector and driver tests.

use rever_catalog::asset::{layer, object_type};
use rever_catalog::{CatalogAsset, PathEntry};

use crate::catalog::RecordingCatalog;

/// Builder for [`CatalogAsset`] values.
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    asset: CatalogAsset,
}

impl AssetBuilder {
    fn new(id: &str, object_type: &str, name: &str) -> Self {
        Self {
            asset: CatalogAsset {
                id: id.to_string(),
                object_type: object_type.to_string(),
                physical_name: name.to_string(),
                ..CatalogAsset::default()
            },
        }
    }

    /// Starts a container-level asset (project, account).
    pub fn container(id: &str, name: &str) -> Self {
        Self::new(id, object_type::SCHEMA, name)
    }

    /// Starts a schema-level asset.
    pub fn schema(id: &str, name: &str) -> Self {
        Self::new(id, object_type::SCHEMA, name)
    }

    /// Starts a table-level asset.
    pub fn table(id: &str, name: &str) -> Self {
        Self::new(id, object_type::TABLE, name)
    }

    /// Starts a column-level asset.
    pub fn column(id: &str, name: &str) -> Self {
        Self::new(id, object_type::COLUMN, name)
    }

    /// Sets the service name.
    #[must_use]
    pub fn service(mut self, service: &str) -> Self {
        self.asset.service_name = service.to_string();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.asset.description = description.to_string();
        self
    }

    /// Sets the logical name.
    #[must_use]
    pub fn logical_name(mut self, logical_name: &str) -> Self {
        self.asset.logical_name = logical_name.to_string();
        self
    }

    /// Sets the creator.
    #[must_use]
    pub fn created_by(mut self, created_by: &str) -> Self {
        self.asset.created_by = created_by.to_string();
        self
    }

    /// Marks the asset as lost.
    #[must_use]
    pub fn lost(mut self) -> Self {
        self.asset.is_lost = true;
        self
    }

    /// Sets the child IDs.
    #[must_use]
    pub fn children<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        self.asset.child_asset_ids = ids.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Appends an ancestor entry.
    #[must_use]
    pub fn ancestor(mut self, path_layer: &str, id: &str, name: &str) -> Self {
        self.asset.path.push(PathEntry {
            path_layer: path_layer.to_string(),
            id: id.to_string(),
            object_type: String::new(),
            name: name.to_string(),
        });
        self
    }

    /// Finishes the asset.
    pub fn build(self) -> CatalogAsset {
        self.asset
    }
}

/// A one-schema, one-table hierarchy: `sales_db.orders(amount, currency)`.
#[derive(Debug, Clone)]
pub struct SalesFixture {
    /// Container assets (empty when built without a container level).
    pub containers: Vec<CatalogAsset>,
    /// The `sales_db` schema.
    pub schema: CatalogAsset,
    /// The `orders` table.
    pub table: CatalogAsset,
    /// The `amount` and `currency` columns.
    pub columns: Vec<CatalogAsset>,
}

impl SalesFixture {
    /// Builds the hierarchy for `service`.
    ///
    /// With `with_container` the schema sits under a `schema4` container
    /// named `my-project`, as BigQuery and Athena catalogs do.
    pub fn new(service: &str, with_container: bool) -> Self {
        let mut schema = AssetBuilder::schema("db-1", "sales_db")
            .service(service)
            .description("Sales data")
            .logical_name("売上")
            .children(&["tbl-1"]);
        let mut table = AssetBuilder::table("tbl-1", "orders")
            .service(service)
            .description("Orders table")
            .logical_name("注文")
            .children(&["col-1", "col-2"]);
        let mut amount = AssetBuilder::column("col-1", "amount")
            .service(service)
            .description("Order amount")
            .logical_name("金額");
        let mut currency = AssetBuilder::column("col-2", "currency").service(service);

        let mut containers = Vec::new();
        if with_container {
            containers.push(
                AssetBuilder::container("proj-1", "my-project")
                    .service(service)
                    .children(&["db-1"])
                    .build(),
            );
            schema = schema.ancestor(layer::SCHEMA4, "proj-1", "my-project");
            table = table.ancestor(layer::SCHEMA4, "proj-1", "my-project");
            amount = amount.ancestor(layer::SCHEMA4, "proj-1", "my-project");
            currency = currency.ancestor(layer::SCHEMA4, "proj-1", "my-project");
        }
        table = table.ancestor(layer::SCHEMA3, "db-1", "sales_db");
        amount = amount
            .ancestor(layer::SCHEMA3, "db-1", "sales_db")
            .ancestor(layer::TABLE, "tbl-1", "orders");
        currency = currency
            .ancestor(layer::SCHEMA3, "db-1", "sales_db")
            .ancestor(layer::TABLE, "tbl-1", "orders");

        Self {
            containers,
            schema: schema.build(),
            table: table.build(),
            columns: vec![amount.build(), currency.build()],
        }
    }

    /// Root assets as listed by the catalog.
    pub fn roots(&self) -> Vec<CatalogAsset> {
        if self.containers.is_empty() {
            vec![self.schema.clone()]
        } else {
            self.containers.clone()
        }
    }

    /// Every asset in the fixture.
    pub fn all_assets(&self) -> Vec<CatalogAsset> {
        let mut all = self.containers.clone();
        all.push(self.schema.clone());
        all.push(self.table.clone());
        all.extend(self.columns.iter().cloned());
        all
    }

    /// Loads the fixture into `catalog` as a single root page.
    pub fn load_into(&self, catalog: &RecordingCatalog) {
        catalog.push_root_page(self.roots(), "");
        catalog.insert_all(self.all_assets());
    }
}

/// Creates `n` column assets named `col_{i}` with IDs `c-{i}`.
pub fn numbered_columns(n: usize) -> Vec<CatalogAsset> {
    (0..n)
        .map(|i| {
            AssetBuilder::column(&format!("c-{i}"), &format!("col_{i}"))
                .description(&format!("column {i}"))
                .build()
        })
        .collect()
}
