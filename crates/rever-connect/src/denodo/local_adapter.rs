use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use rever_catalog::CatalogAsset;
use rever_core::{DescriptionFormat, SkipReason, TargetDescription, UpdateOutcome};

use super::LOCAL_SYSTEM;
use super::local::{DenodoLocalClient, LocalDatabase, LocalField};
use crate::adapter::{ColumnOutcome, TableReport, TableRequest, TargetAdapter};
use crate::error::TargetError;
use crate::plan::{Plan, UpdatePolicy, outcome_from_error, outcome_of, plan_update};

/// Writes local database, view and field descriptions of the Denodo Data
/// Catalog. Entities the catalog does not keep locally are left alone.
#[derive(Debug)]
pub struct LocalCatalogAdapter {
    client: DenodoLocalClient,
    databases: OnceCell<HashMap<String, LocalDatabase>>,
}

fn current(description: Option<&str>) -> TargetDescription<'_> {
    TargetDescription::Present(description.unwrap_or(""))
}

impl LocalCatalogAdapter {
    /// Creates an adapter over `client`.
    #[must_use]
    pub fn new(client: DenodoLocalClient) -> Self {
        Self {
            client,
            databases: OnceCell::new(),
        }
    }

    async fn database(&self, name: &str) -> Result<&LocalDatabase, TargetError> {
        self.databases
            .get_or_try_init(|| async {
                let databases = self.client.databases().await?;
                tracing::debug!(databases = databases.len(), "listed local databases");
                Ok::<_, TargetError>(
                    databases
                        .into_iter()
                        .map(|db| (db.database_name.clone(), db))
                        .collect(),
                )
            })
            .await?
            .get(name)
            .ok_or_else(|| {
                TargetError::not_found(LOCAL_SYSTEM, format!("{name} is not a local database"))
            })
    }

    async fn reconcile_fields(
        &self,
        request: &TableRequest<'_>,
        policy: &UpdatePolicy,
        entity: &str,
    ) -> Vec<ColumnOutcome> {
        let database = request.database();
        let view = request.table.physical_name.as_str();
        let fields: HashMap<String, LocalField> = match self.client.view_fields(database, view).await {
            Ok(fields) => fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            Err(e) => {
                let outcome = outcome_from_error(&e, entity);
                return request
                    .columns
                    .iter()
                    .map(|c| ColumnOutcome::new(c.physical_name.clone(), outcome.clone()))
                    .collect();
            }
        };

        let mut outcomes = Vec::with_capacity(request.columns.len());
        for asset in &request.columns {
            let name = asset.physical_name.as_str();
            let outcome = match fields.get(name) {
                None => UpdateOutcome::Skipped(SkipReason::NotFound),
                Some(field) if !field.in_local => UpdateOutcome::Skipped(SkipReason::Unsupported),
                Some(field) => match plan_update(policy, current(field.description.as_deref()), asset) {
                    Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
                    Plan::Write(text) => outcome_of(
                        self.client.update_field(database, view, name, &text).await,
                        &format!("{entity}.{name}"),
                    ),
                },
            };
            let failed = outcome.is_failed();
            outcomes.push(ColumnOutcome::new(name, outcome));
            if failed {
                break;
            }
        }
        outcomes
    }
}

#[async_trait]
impl TargetAdapter for LocalCatalogAdapter {
    fn system(&self) -> &'static str {
        LOCAL_SYSTEM
    }

    fn requires_ascii_names(&self) -> bool {
        true
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
        match plan_update(policy, current(database.database_description.as_deref()), schema) {
            Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
            Plan::Write(text) => {
                let outcome = outcome_of(
                    self.client.update_database(database.database_id, &text).await,
                    name,
                );
                if outcome == UpdateOutcome::Updated {
                    tracing::info!(database = %name, "local database description was updated");
                }
                outcome
            }
        }
    }

    async fn reconcile_table(&self, request: &TableRequest<'_>, policy: &UpdatePolicy) -> TableReport {
        let entity = request.qualified_name();
        let mut report = TableReport::default();

        if request.update_table {
            let outcome = match self
                .client
                .view_details(request.database(), &request.table.physical_name)
                .await
            {
                Err(e) => outcome_from_error(&e, &entity),
                Ok(view) if !view.in_local => {
                    tracing::debug!(table = %entity, "view is not kept locally");
                    UpdateOutcome::Skipped(SkipReason::Unsupported)
                }
                Ok(view) => match plan_update(policy, current(view.description.as_deref()), request.table) {
                    Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
                    Plan::Write(text) => outcome_of(self.client.update_view(view.id, &text).await, &entity),
                },
            };
            let failed = outcome.is_failed();
            report.table = Some(outcome);
            if failed {
                return report;
            }
        }

        if !request.columns.is_empty() {
            report.columns = self.reconcile_fields(request, policy, &entity).await;
        }
        report
    }
}
