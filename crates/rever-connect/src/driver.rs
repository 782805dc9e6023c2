//! The reconciliation driver.
//!
//! A run assembles the catalog tree once, then walks it in two passes:
//! every schema, then every table together with its columns. Entities are
//! processed one at a time. The driver gates what the catalog says must not
//! be written (lost assets, empty descriptions, unaddressable or disallowed
//! names) before the adapter is called, and stops at the first failed
//! outcome.

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use rever_catalog::{AssembleOptions, AssetTree, CatalogAsset, CatalogSource, assemble_tree, layer};
use rever_core::names::is_addressable_name;
use rever_core::observability::{entity_span, reconcile_span};
use rever_core::{EntityLevel, ReconcileConfig, RunSummary, SkipReason, UpdateOutcome};

use crate::adapter::{TableReport, TableRequest, TargetAdapter};
use crate::error::{Error, Phase, Result};
use crate::plan::UpdatePolicy;

/// Summaries of one run, one per target system, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// `(system, summary)` pairs.
    pub systems: Vec<(&'static str, RunSummary)>,
}

impl RunReport {
    /// Returns the summary of `system`.
    #[must_use]
    pub fn summary(&self, system: &str) -> Option<&RunSummary> {
        self.systems
            .iter()
            .find(|(name, _)| *name == system)
            .map(|(_, summary)| summary)
    }

    /// Writes issued across every system.
    #[must_use]
    pub fn total_updated(&self) -> usize {
        self.systems.iter().map(|(_, s)| s.total_updated()).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (system, summary)) in self.systems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{system}: {summary}")?;
        }
        Ok(())
    }
}

/// Runs one reconciliation of a catalog service against its target systems.
pub struct Reconciler {
    source: Arc<dyn CatalogSource>,
    adapters: Vec<Box<dyn TargetAdapter>>,
    config: ReconcileConfig,
    container_depth: usize,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("adapters", &self.adapters)
            .field("config", &self.config)
            .field("container_depth", &self.container_depth)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a driver with no adapters whose catalog roots are schemas.
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, config: ReconcileConfig) -> Self {
        Self {
            source,
            adapters: Vec::new(),
            config,
            container_depth: 0,
        }
    }

    /// Adds a target system. Adapters run in the order they are added.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Box<dyn TargetAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Sets the number of container levels above the schemas.
    #[must_use]
    pub const fn with_container_depth(mut self, depth: usize) -> Self {
        self.container_depth = depth;
        self
    }

    fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            service: self.config.service.clone(),
            created_by: self.config.created_by.clone(),
            container_depth: self.container_depth,
            allow_list: self.config.database_allow_list.clone(),
        }
    }

    /// Runs the reconciliation to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the tree cannot be assembled and
    /// [`Error::Aborted`] on the first failed entity.
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        if self.adapters.is_empty() {
            return Err(rever_core::Error::configuration("no target system configured").into());
        }

        let tree = assemble_tree(self.source.as_ref(), &self.assemble_options())
            .instrument(reconcile_span(&self.config.service, Phase::AssembleTree.as_str()))
            .await?;

        let mut report = RunReport::default();
        for adapter in &self.adapters {
            let pass = Pass {
                adapter: adapter.as_ref(),
                config: &self.config,
                policy: UpdatePolicy::new(
                    self.config.overwrite_mode,
                    self.config.prefix.clone(),
                    adapter.description_format(),
                ),
            };
            let summary = pass.run(&tree).await?;
            report.systems.push((adapter.system(), summary));
        }
        Ok(report)
    }
}

/// One adapter's walk over the tree.
struct Pass<'a> {
    adapter: &'a dyn TargetAdapter,
    config: &'a ReconcileConfig,
    policy: UpdatePolicy,
}

impl Pass<'_> {
    async fn run(&self, tree: &AssetTree) -> Result<RunSummary> {
        let system = self.adapter.system();
        let mut summary = RunSummary::default();
        self.reconcile_schemas(tree, &mut summary)
            .instrument(reconcile_span(system, Phase::ReconcileSchemas.as_str()))
            .await?;
        self.reconcile_tables(tree, &mut summary)
            .instrument(reconcile_span(system, Phase::ReconcileTables.as_str()))
            .await?;
        tracing::info!(system, phase = %Phase::Done, %summary, "reconciliation finished");
        Ok(summary)
    }

    fn schema_gate(&self, schema: &CatalogAsset) -> Option<SkipReason> {
        if schema.is_lost {
            Some(SkipReason::Lost)
        } else if !schema.has_description() {
            Some(SkipReason::EmptyCatalogDescription)
        } else if !self.config.allows_database(&schema.physical_name) {
            Some(SkipReason::NotAllowed)
        } else {
            None
        }
    }

    /// Reasons that exclude a table together with its columns.
    fn table_gate(&self, table: &CatalogAsset) -> Option<SkipReason> {
        let database = table.ancestor_name(layer::SCHEMA3);
        if table.is_lost {
            Some(SkipReason::Lost)
        } else if self.adapter.requires_ascii_names()
            && !(is_addressable_name(database) && is_addressable_name(&table.physical_name))
        {
            Some(SkipReason::UnaddressableName)
        } else if !self.config.allows_database(database) {
            Some(SkipReason::NotAllowed)
        } else {
            None
        }
    }

    fn column_gate(column: &CatalogAsset) -> Option<SkipReason> {
        if column.is_lost {
            Some(SkipReason::Lost)
        } else if !column.has_description() {
            Some(SkipReason::EmptyCatalogDescription)
        } else {
            None
        }
    }

    async fn reconcile_schemas(
        &self,
        tree: &AssetTree,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for schema in &tree.schemas {
            let outcome = match self.schema_gate(schema) {
                Some(reason) => UpdateOutcome::Skipped(reason),
                None => {
                    self.adapter
                        .reconcile_schema(schema, &self.policy)
                        .instrument(entity_span(
                            EntityLevel::Schema.as_str(),
                            &schema.physical_name,
                        ))
                        .await
                }
            };
            tracing::debug!(schema = %schema.physical_name, ?outcome, "reconciled schema");
            self.check(Phase::ReconcileSchemas, &schema.physical_name, &outcome)?;
            summary.record(EntityLevel::Schema, &outcome);
        }
        Ok(())
    }

    async fn reconcile_tables(
        &self,
        tree: &AssetTree,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for (table, columns) in tree.columns_by_table() {
            let mut request = TableRequest {
                table,
                update_table: false,
                columns: Vec::new(),
            };
            let entity = request.qualified_name();

            if let Some(reason) = self.table_gate(table) {
                tracing::debug!(table = %entity, ?reason, "skipping table and its columns");
                summary.record(EntityLevel::Table, &UpdateOutcome::Skipped(reason));
                for _ in &columns {
                    summary.record(EntityLevel::Column, &UpdateOutcome::Skipped(reason));
                }
                continue;
            }

            if table.has_description() {
                request.update_table = true;
            } else {
                summary.record(
                    EntityLevel::Table,
                    &UpdateOutcome::Skipped(SkipReason::EmptyCatalogDescription),
                );
            }
            for column in columns {
                match Self::column_gate(column) {
                    Some(reason) => {
                        summary.record(EntityLevel::Column, &UpdateOutcome::Skipped(reason));
                    }
                    None => request.columns.push(column),
                }
            }
            if request.is_empty() {
                continue;
            }

            let report = self
                .adapter
                .reconcile_table(&request, &self.policy)
                .instrument(entity_span(EntityLevel::Table.as_str(), &entity))
                .await;
            self.record_table(&entity, &report, summary)?;
        }
        Ok(())
    }

    fn record_table(
        &self,
        entity: &str,
        report: &TableReport,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if let Some(outcome) = &report.table {
            tracing::debug!(table = %entity, ?outcome, "reconciled table");
            self.check(Phase::ReconcileTables, entity, outcome)?;
            summary.record(EntityLevel::Table, outcome);
        }
        for column in &report.columns {
            let name = format!("{entity}.{}", column.name);
            tracing::debug!(column = %name, outcome = ?column.outcome, "reconciled column");
            self.check(Phase::ReconcileColumns, &name, &column.outcome)?;
            summary.record(EntityLevel::Column, &column.outcome);
        }
        Ok(())
    }

    fn check(&self, phase: Phase, entity: &str, outcome: &UpdateOutcome) -> Result<()> {
        let UpdateOutcome::Failed { kind, message } = outcome else {
            return Ok(());
        };
        let system = self.adapter.system();
        tracing::error!(system, %phase, entity, %kind, error = %message, "aborting reconciliation");
        Err(Error::Aborted {
            system,
            phase,
            entity: entity.to_string(),
            kind: *kind,
            message: message.clone(),
        })
    }
}
