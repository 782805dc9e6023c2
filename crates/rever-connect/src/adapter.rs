//! The seam between the driver and one target system.

use std::fmt::Debug;

use async_trait::async_trait;

use rever_catalog::{CatalogAsset, layer};
use rever_core::{DescriptionFormat, UpdateOutcome};

use crate::plan::UpdatePolicy;

/// One table and the columns the driver wants reconciled with it.
#[derive(Debug, Clone)]
pub struct TableRequest<'a> {
    /// The table asset.
    pub table: &'a CatalogAsset,
    /// Whether the table's own description should be reconciled.
    pub update_table: bool,
    /// Columns that passed the driver's gates, in catalog order.
    pub columns: Vec<&'a CatalogAsset>,
}

impl TableRequest<'_> {
    /// Physical name of the containing database.
    #[must_use]
    pub fn database(&self) -> &str {
        self.table.ancestor_name(layer::SCHEMA3)
    }

    /// `database.table`, for logs and error reports.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.database(), self.table.physical_name)
    }

    /// Returns true if there is nothing to reconcile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.update_table && self.columns.is_empty()
    }
}

/// Outcome of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOutcome {
    /// Physical column name.
    pub name: String,
    /// What happened to it.
    pub outcome: UpdateOutcome,
}

impl ColumnOutcome {
    /// Creates a column outcome.
    #[must_use]
    pub fn new(name: impl Into<String>, outcome: UpdateOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// Outcomes of one [`TableRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    /// Outcome of the table description, `None` when it was not requested.
    pub table: Option<UpdateOutcome>,
    /// Outcome of each requested column, in request order.
    pub columns: Vec<ColumnOutcome>,
}

impl TableReport {
    /// Applies one outcome to the table and every requested column.
    ///
    /// Used when the table cannot be resolved at all.
    #[must_use]
    pub fn uniform(request: &TableRequest<'_>, outcome: &UpdateOutcome) -> Self {
        Self {
            table: request.update_table.then(|| outcome.clone()),
            columns: request
                .columns
                .iter()
                .map(|c| ColumnOutcome::new(c.physical_name.clone(), outcome.clone()))
                .collect(),
        }
    }
}

/// Writes catalog descriptions into one target system.
///
/// Implementations resolve the live entity, read its description, plan the
/// write with [`plan_update`](crate::plan::plan_update) and classify every
/// vendor failure into an [`UpdateOutcome`]. Transient failures are retried
/// by the clients underneath, not here.
#[async_trait]
pub trait TargetAdapter: Debug + Send + Sync {
    /// Short system name used in logs and errors.
    fn system(&self) -> &'static str;

    /// Returns true if tables can only be addressed through ASCII database
    /// and table names. Schemas are always passed through.
    fn requires_ascii_names(&self) -> bool {
        false
    }

    /// How catalog text is rendered for this system.
    fn description_format(&self) -> DescriptionFormat {
        DescriptionFormat::Plain
    }

    /// Reconciles a schema-level entity (dataset, database).
    async fn reconcile_schema(&self, schema: &CatalogAsset, policy: &UpdatePolicy)
    -> UpdateOutcome;

    /// Reconciles a table and its columns.
    async fn reconcile_table(
        &self,
        request: &TableRequest<'_>,
        policy: &UpdatePolicy,
    ) -> TableReport;
}
