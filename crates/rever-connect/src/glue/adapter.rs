use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_glue::types::{Database, Table};
use tokio::sync::OnceCell;

use rever_catalog::{AssetIndex, CatalogAsset, IndexStrategy};
use rever_core::{SkipReason, TargetDescription, UpdateOutcome};

use super::SYSTEM;
use super::client::GlueCatalog;
use super::convert::{database_input, table_input};
use crate::adapter::{ColumnOutcome, TableReport, TableRequest, TargetAdapter};
use crate::error::TargetError;
use crate::plan::{Plan, UpdatePolicy, outcome_from_error, outcome_of, plan_update};

/// Writes database, table and column descriptions through Glue.
#[derive(Debug)]
pub struct GlueAdapter<C> {
    catalog: C,
    databases: OnceCell<HashMap<String, Database>>,
}

/// What one `UpdateTable` call will change.
#[derive(Debug)]
struct TableChanges {
    table: Option<Plan>,
    /// Plans by column name; requested columns missing from the table have none.
    columns: HashMap<String, Plan>,
}

impl TableChanges {
    fn writes_table(&self) -> bool {
        matches!(self.table, Some(Plan::Write(_)))
    }

    fn column_writes(&self) -> usize {
        self.columns
            .values()
            .filter(|p| matches!(p, Plan::Write(_)))
            .count()
    }
}

fn update_message(table: bool, columns: bool) -> &'static str {
    match (table, columns) {
        (true, true) => "table and column descriptions were updated",
        (true, false) => "table description was updated",
        (false, true) => "column descriptions were updated",
        (false, false) => "nothing was updated",
    }
}

/// Plans the table description and column comments, applying the writes to
/// `table` in place.
fn plan_table(table: &mut Table, request: &TableRequest<'_>, policy: &UpdatePolicy) -> TableChanges {
    let mut changes = TableChanges {
        table: None,
        columns: HashMap::new(),
    };

    if request.update_table {
        let plan = plan_update(
            policy,
            TargetDescription::from_option(table.description.as_deref()),
            request.table,
        );
        if let Plan::Write(text) = &plan {
            table.description = Some(text.clone());
        }
        changes.table = Some(plan);
    }

    let wanted = AssetIndex::build(IndexStrategy::ByPhysicalName, request.columns.iter().copied());
    let columns = table
        .storage_descriptor
        .as_mut()
        .and_then(|sd| sd.columns.as_mut());
    for column in columns.into_iter().flatten() {
        let Some(asset) = wanted.get(&column.name) else {
            continue;
        };
        let plan = plan_update(
            policy,
            TargetDescription::from_option(column.comment.as_deref()),
            asset,
        );
        if let Plan::Write(text) = &plan {
            column.comment = Some(text.clone());
        }
        changes.columns.insert(column.name.clone(), plan);
    }
    changes
}

impl<C: GlueCatalog> GlueAdapter<C> {
    /// Creates an adapter over `catalog`.
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            databases: OnceCell::new(),
        }
    }

    async fn list_databases(&self) -> Result<HashMap<String, Database>, TargetError> {
        let mut databases = HashMap::new();
        let mut next_token = None;
        loop {
            let page = self.catalog.get_databases(next_token).await?;
            for database in page.databases {
                databases.insert(database.name().to_string(), database);
            }
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!(databases = databases.len(), "listed glue databases");
        Ok(databases)
    }

    async fn database(&self, name: &str) -> Result<&Database, TargetError> {
        self.databases
            .get_or_try_init(|| self.list_databases())
            .await?
            .get(name)
            .ok_or_else(|| TargetError::not_found(SYSTEM, format!("database {name} is not in glue")))
    }
}

#[async_trait]
impl<C: GlueCatalog> TargetAdapter for GlueAdapter<C> {
    fn system(&self) -> &'static str {
        SYSTEM
    }

    async fn reconcile_schema(&self, schema: &CatalogAsset, policy: &UpdatePolicy) -> UpdateOutcome {
        let name = &schema.physical_name;
        let database = match self.database(name).await {
            Ok(database) => database,
            Err(e) => return outcome_from_error(&e, name),
        };
        let current = TargetDescription::from_option(database.description());
        let text = match plan_update(policy, current, schema) {
            Plan::Skip(reason) => return UpdateOutcome::Skipped(reason),
            Plan::Write(text) => text,
        };

        let mut updated = database.clone();
        updated.description = Some(text);
        let result = match database_input(&updated) {
            Ok(input) => self.catalog.update_database(name, input).await,
            Err(e) => Err(e),
        };
        let outcome = outcome_of(result, name);
        if outcome == UpdateOutcome::Updated {
            tracing::info!(database = %name, "database description was updated");
        }
        outcome
    }

    async fn reconcile_table(&self, request: &TableRequest<'_>, policy: &UpdatePolicy) -> TableReport {
        let entity = request.qualified_name();
        let database = request.database();
        let mut table = match self
            .catalog
            .get_table(database, &request.table.physical_name)
            .await
        {
            Ok(table) => table,
            Err(e) => return TableReport::uniform(request, &outcome_from_error(&e, &entity)),
        };

        let changes = plan_table(&mut table, request, policy);
        let writes_table = changes.writes_table();
        let column_writes = changes.column_writes();

        let written = if writes_table || column_writes > 0 {
            let result = match table_input(&table) {
                Ok(input) => self.catalog.update_table(database, input).await,
                Err(e) => Err(e),
            };
            let outcome = outcome_of(result, &entity);
            if outcome == UpdateOutcome::Updated {
                tracing::info!(
                    table = %entity,
                    columns = column_writes,
                    "{}",
                    update_message(writes_table, column_writes > 0)
                );
            }
            Some(outcome)
        } else {
            None
        };

        let resolve = |plan: Option<&Plan>| match plan {
            Some(Plan::Write(_)) => written.clone().unwrap_or(UpdateOutcome::Updated),
            Some(Plan::Skip(reason)) => UpdateOutcome::Skipped(*reason),
            None => UpdateOutcome::Skipped(SkipReason::NotFound),
        };
        TableReport {
            table: request.update_table.then(|| resolve(changes.table.as_ref())),
            columns: request
                .columns
                .iter()
                .map(|column| {
                    let plan = changes.columns.get(&column.physical_name);
                    ColumnOutcome::new(column.physical_name.clone(), resolve(plan))
                })
                .collect(),
        }
    }
}
