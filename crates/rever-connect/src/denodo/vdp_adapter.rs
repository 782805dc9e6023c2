use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};

use rever_catalog::CatalogAsset;
use rever_core::{DescriptionFormat, SkipReason, TargetDescription, UpdateOutcome};

use super::VDP_SYSTEM;
use super::vdp::{
    VdpCatalog, VdpDatabase, VdpView, VdpViewColumn, VdpViewType, alter_column_statement,
    alter_database_statement, alter_view_statement,
};
use crate::adapter::{ColumnOutcome, TableReport, TableRequest, TargetAdapter};
use crate::error::TargetError;
use crate::plan::{Plan, UpdatePolicy, outcome_from_error, outcome_of, plan_update};

/// Views and columns of one VDP database, read once per run.
#[derive(Debug, Default)]
struct DatabaseObjects {
    views: HashMap<String, VdpView>,
    columns: HashMap<(String, String), VdpViewColumn>,
}

/// Writes VDP database, view and derived-view column descriptions.
#[derive(Debug)]
pub struct VdpAdapter<C> {
    vdp: C,
    databases: OnceCell<HashMap<String, VdpDatabase>>,
    objects: Mutex<HashMap<String, Arc<DatabaseObjects>>>,
}

impl<C: VdpCatalog> VdpAdapter<C> {
    /// Creates an adapter over `vdp`.
    pub fn new(vdp: C) -> Self {
        Self {
            vdp,
            databases: OnceCell::new(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    async fn database(&self, name: &str) -> Result<&VdpDatabase, TargetError> {
        self.databases
            .get_or_try_init(|| async {
                let rows = self.vdp.databases().await?;
                Ok::<_, TargetError>(
                    rows.into_iter()
                        .map(|db| (db.db_name.clone(), db))
                        .collect(),
                )
            })
            .await?
            .get(name)
            .ok_or_else(|| TargetError::not_found(VDP_SYSTEM, format!("database {name} is not in vdp")))
    }

    async fn objects(&self, database: &str) -> Result<Arc<DatabaseObjects>, TargetError> {
        let mut cache = self.objects.lock().await;
        if let Some(objects) = cache.get(database) {
            return Ok(Arc::clone(objects));
        }
        let views = self.vdp.views(database).await?;
        let columns = self.vdp.view_columns(database).await?;
        tracing::debug!(database, views = views.len(), columns = columns.len(), "read vdp objects");
        let objects = Arc::new(DatabaseObjects {
            views: views.into_iter().map(|v| (v.name.clone(), v)).collect(),
            columns: columns
                .into_iter()
                .map(|c| ((c.view_name.clone(), c.column_name.clone()), c))
                .collect(),
        });
        cache.insert(database.to_string(), Arc::clone(&objects));
        Ok(objects)
    }

    async fn write(&self, database: &str, statement: String, entity: &str) -> UpdateOutcome {
        tracing::debug!(database, %statement, "executing vql");
        outcome_of(self.vdp.execute(database, &statement).await, entity)
    }

    async fn reconcile_view(
        &self,
        database: &str,
        view: &VdpView,
        table: &CatalogAsset,
        policy: &UpdatePolicy,
        entity: &str,
    ) -> UpdateOutcome {
        let current = TargetDescription::from_option(view.description.as_deref());
        match plan_update(policy, current, table) {
            Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
            Plan::Write(text) => {
                let outcome = self
                    .write(database, alter_view_statement(view, &text), entity)
                    .await;
                if outcome == UpdateOutcome::Updated {
                    tracing::info!(table = %entity, "view description was updated");
                }
                outcome
            }
        }
    }

    async fn reconcile_column(
        &self,
        database: &str,
        column: Option<&VdpViewColumn>,
        asset: &CatalogAsset,
        policy: &UpdatePolicy,
        entity: &str,
    ) -> UpdateOutcome {
        let Some(column) = column else {
            tracing::warn!(column = %entity, "column is not in vdp");
            return UpdateOutcome::Skipped(SkipReason::NotFound);
        };
        if VdpViewType::from_code(column.view_type) != VdpViewType::Derived {
            tracing::debug!(column = %entity, "only derived views take column descriptions");
            return UpdateOutcome::Skipped(SkipReason::Unsupported);
        }
        let current = TargetDescription::from_option(column.column_remarks.as_deref());
        match plan_update(policy, current, asset) {
            Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
            Plan::Write(text) => {
                self.write(database, alter_column_statement(column, &text), entity)
                    .await
            }
        }
    }
}

#[async_trait]
impl<C: VdpCatalog> TargetAdapter for VdpAdapter<C> {
    fn system(&self) -> &'static str {
        VDP_SYSTEM
    }

    fn description_format(&self) -> DescriptionFormat {
        DescriptionFormat::LabeledLogicalName
    }

    async fn reconcile_schema(&self, schema: &CatalogAsset, policy: &UpdatePolicy) -> UpdateOutcome {
        let name = &schema.physical_name;
        let database = match self.database(name).await {
            Ok(database) => database,
            Err(e) => return outcome_from_error(&e, name),
        };
        let current = TargetDescription::from_option(database.description.as_deref());
        match plan_update(policy, current, schema) {
            Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
            Plan::Write(text) => {
                let outcome = self
                    .write(name, alter_database_statement(name, &text), name)
                    .await;
                if outcome == UpdateOutcome::Updated {
                    tracing::info!(database = %name, "database description was updated");
                }
                outcome
            }
        }
    }

    async fn reconcile_table(&self, request: &TableRequest<'_>, policy: &UpdatePolicy) -> TableReport {
        let entity = request.qualified_name();
        let database = request.database();
        let view_name = request.table.physical_name.as_str();
        if let Err(e) = self.database(database).await {
            return TableReport::uniform(request, &outcome_from_error(&e, &entity));
        }
        let objects = match self.objects(database).await {
            Ok(objects) => objects,
            Err(e) => return TableReport::uniform(request, &outcome_from_error(&e, &entity)),
        };
        let Some(view) = objects.views.get(view_name) else {
            tracing::warn!(table = %entity, "view is not in vdp");
            return TableReport::uniform(request, &UpdateOutcome::Skipped(SkipReason::NotFound));
        };

        let mut report = TableReport::default();
        if request.update_table {
            let outcome = self
                .reconcile_view(database, view, request.table, policy, &entity)
                .await;
            let failed = outcome.is_failed();
            report.table = Some(outcome);
            if failed {
                return report;
            }
        }

        for asset in &request.columns {
            let column_entity = format!("{entity}.{}", asset.physical_name);
            let column = objects
                .columns
                .get(&(view_name.to_string(), asset.physical_name.clone()));
            let outcome = self
                .reconcile_column(database, column, asset, policy, &column_entity)
                .await;
            let failed = outcome.is_failed();
            report
                .columns
                .push(ColumnOutcome::new(asset.physical_name.clone(), outcome));
            if failed {
                break;
            }
        }
        report
    }
}
