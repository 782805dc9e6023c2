use std::collections::HashMap;

use async_trait::async_trait;

use rever_catalog::{AssetIndex, CatalogAsset, IndexStrategy, layer};
use rever_core::{SkipReason, TargetDescription, UpdateOutcome};

use super::SYSTEM;
use super::client::{BigQueryClient, Table};
use crate::adapter::{ColumnOutcome, TableReport, TableRequest, TargetAdapter};
use crate::plan::{Plan, UpdatePolicy, outcome_from_error, outcome_of, plan_update};

/// Writes dataset, table overview and column descriptions.
#[derive(Debug)]
pub struct BigQueryAdapter {
    client: BigQueryClient,
}

/// Removes the paragraph markup, opening and closing tags, that the Data
/// Catalog UI wraps overviews in.
fn strip_markup(overview: &str) -> String {
    overview.replace("<p>", "").replace("</p>", "")
}

impl BigQueryAdapter {
    /// Creates an adapter over `client`.
    #[must_use]
    pub const fn new(client: BigQueryClient) -> Self {
        Self { client }
    }

    fn project_of<'a>(&'a self, asset: &'a CatalogAsset) -> &'a str {
        match asset.ancestor_name(layer::SCHEMA4) {
            "" => self.client.default_project(),
            project => project,
        }
    }

    /// Plans every requested column against the live schema and writes the
    /// changed ones in a single `tables.update`.
    async fn reconcile_columns(
        &self,
        request: &TableRequest<'_>,
        policy: &UpdatePolicy,
        project: &str,
        mut table: Table,
    ) -> Vec<ColumnOutcome> {
        let entity = request.qualified_name();
        let mut outcomes: HashMap<String, UpdateOutcome> = HashMap::new();
        let mut pending = Vec::new();

        let wanted = AssetIndex::build(IndexStrategy::ByPhysicalName, request.columns.iter().copied());
        if let Some(schema) = table.schema.as_mut() {
            for field in &mut schema.fields {
                let Some(asset) = wanted.get(&field.name) else {
                    continue;
                };
                let current = TargetDescription::Present(field.description.as_deref().unwrap_or(""));
                match plan_update(policy, current, asset) {
                    Plan::Write(text) => {
                        field.description = Some(text);
                        pending.push(field.name.clone());
                    }
                    Plan::Skip(reason) => {
                        outcomes.insert(field.name.clone(), UpdateOutcome::Skipped(reason));
                    }
                }
            }
        }

        if !pending.is_empty() {
            let written = outcome_of(
                self.client
                    .update_table(project, request.database(), &request.table.physical_name, &table)
                    .await,
                &entity,
            );
            if written == UpdateOutcome::Updated {
                tracing::info!(table = %entity, columns = pending.len(), "column descriptions were updated");
            }
            for name in pending {
                outcomes.insert(name, written.clone());
            }
        }

        request
            .columns
            .iter()
            .map(|column| {
                let outcome = outcomes.remove(&column.physical_name).unwrap_or_else(|| {
                    tracing::warn!(table = %entity, column = %column.physical_name, "column not in table schema");
                    UpdateOutcome::Skipped(SkipReason::NotFound)
                });
                ColumnOutcome::new(column.physical_name.clone(), outcome)
            })
            .collect()
    }

    async fn reconcile_overview(
        &self,
        request: &TableRequest<'_>,
        policy: &UpdatePolicy,
        project: &str,
        location: Option<&str>,
    ) -> UpdateOutcome {
        let entity = request.qualified_name();
        let fqn = format!(
            "bigquery:{project}.{}.{}",
            request.database(),
            request.table.physical_name
        );
        let entry = match self.client.lookup_entry(&fqn, project, location).await {
            Ok(entry) => entry,
            Err(e) => return outcome_from_error(&e, &entity),
        };
        let overview = entry.overview().map(strip_markup);
        let current = TargetDescription::from_option(overview.as_deref());
        match plan_update(policy, current, request.table) {
            Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
            Plan::Write(text) => {
                let outcome = outcome_of(
                    self.client.modify_entry_overview(&entry.name, &text).await,
                    &entity,
                );
                if outcome == UpdateOutcome::Updated {
                    tracing::info!(table = %entity, "table overview was updated");
                }
                outcome
            }
        }
    }
}

#[async_trait]
impl TargetAdapter for BigQueryAdapter {
    fn system(&self) -> &'static str {
        SYSTEM
    }

    async fn reconcile_schema(&self, schema: &CatalogAsset, policy: &UpdatePolicy) -> UpdateOutcome {
        let project = self.project_of(schema);
        let name = &schema.physical_name;
        let mut dataset = match self.client.get_dataset(project, name).await {
            Ok(dataset) => dataset,
            Err(e) => return outcome_from_error(&e, name),
        };
        let current = TargetDescription::Present(dataset.description.as_deref().unwrap_or(""));
        match plan_update(policy, current, schema) {
            Plan::Skip(reason) => UpdateOutcome::Skipped(reason),
            Plan::Write(text) => {
                dataset.description = Some(text);
                let outcome = outcome_of(
                    self.client.update_dataset(project, name, &dataset).await,
                    name,
                );
                if outcome == UpdateOutcome::Updated {
                    tracing::info!(dataset = %name, "dataset description was updated");
                }
                outcome
            }
        }
    }

    async fn reconcile_table(&self, request: &TableRequest<'_>, policy: &UpdatePolicy) -> TableReport {
        let project = self.project_of(request.table);
        let table = match self
            .client
            .get_table(project, request.database(), &request.table.physical_name)
            .await
        {
            Ok(table) => table,
            Err(e) => {
                let outcome = outcome_from_error(&e, &request.qualified_name());
                return TableReport::uniform(request, &outcome);
            }
        };
        let location = table.location.clone();

        let columns = if request.columns.is_empty() {
            Vec::new()
        } else {
            self.reconcile_columns(request, policy, project, table).await
        };
        if columns.iter().any(|c| c.outcome.is_failed()) {
            return TableReport { table: None, columns };
        }

        let table = if request.update_table {
            Some(
                self.reconcile_overview(request, policy, project, location.as_deref())
                    .await,
            )
        } else {
            None
        };
        TableReport { table, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_stripped() {
        assert_eq!(strip_markup("<p>【QDIC】Orders</p>"), "【QDIC】Orders");
        assert_eq!(strip_markup("plain"), "plain");
    }
}
