//! Driver gating, ordering and abort behaviour with a scripted adapter.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rever_catalog::CatalogAsset;
use rever_catalog::asset::layer;
use rever_connect::{
    ColumnOutcome, Error, Phase, Reconciler, TableReport, TableRequest, TargetAdapter,
    UpdatePolicy,
};
use rever_core::{EntityLevel, ErrorKind, ReconcileConfig, SkipReason, UpdateOutcome};
use rever_test_utils::{AssetBuilder, RecordingCatalog, SalesFixture, assert_level_counts};

/// A call the scripted adapter received.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Schema(String),
    Table {
        table: String,
        update_table: bool,
        columns: Vec<String>,
    },
}

#[derive(Debug)]
struct ScriptedAdapter {
    system: &'static str,
    ascii_only: bool,
    schema_outcome: UpdateOutcome,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedAdapter {
    fn new(system: &'static str) -> Self {
        Self {
            system,
            ascii_only: false,
            schema_outcome: UpdateOutcome::Updated,
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl TargetAdapter for ScriptedAdapter {
    fn system(&self) -> &'static str {
        self.system
    }

    fn requires_ascii_names(&self) -> bool {
        self.ascii_only
    }

    async fn reconcile_schema(&self, schema: &CatalogAsset, _policy: &UpdatePolicy) -> UpdateOutcome {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Schema(schema.physical_name.clone()));
        self.schema_outcome.clone()
    }

    async fn reconcile_table(&self, request: &TableRequest<'_>, _policy: &UpdatePolicy) -> TableReport {
        self.calls.lock().unwrap().push(Call::Table {
            table: request.qualified_name(),
            update_table: request.update_table,
            columns: request
                .columns
                .iter()
                .map(|c| c.physical_name.clone())
                .collect(),
        });
        TableReport {
            table: request.update_table.then_some(UpdateOutcome::Updated),
            columns: request
                .columns
                .iter()
                .map(|c| ColumnOutcome::new(c.physical_name.clone(), UpdateOutcome::Updated))
                .collect(),
        }
    }
}

fn sales_catalog(fixture: &SalesFixture) -> Arc<RecordingCatalog> {
    let catalog = RecordingCatalog::new();
    fixture.load_into(&catalog);
    Arc::new(catalog)
}

fn sales_reconciler() -> Reconciler {
    Reconciler::new(
        sales_catalog(&SalesFixture::new("denodo", false)),
        ReconcileConfig::new("denodo"),
    )
}

#[tokio::test]
async fn schemas_are_reconciled_before_tables() {
    let adapter = ScriptedAdapter::new("scripted");
    let calls = adapter.calls();

    let report = sales_reconciler()
        .with_adapter(Box::new(adapter))
        .run()
        .await
        .unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Schema("sales_db".into()),
            Call::Table {
                table: "sales_db.orders".into(),
                update_table: true,
                columns: vec!["amount".into()],
            },
        ]
    );
    let summary = report.summary("scripted").unwrap();
    assert_level_counts(summary, EntityLevel::Schema, 1, 0);
    assert_level_counts(summary, EntityLevel::Column, 1, 1);
}

#[tokio::test]
async fn empty_and_lost_entities_never_reach_the_adapter() {
    let mut fixture = SalesFixture::new("denodo", false);
    fixture.schema.description.clear();
    fixture.table.description.clear();
    fixture.columns[0].is_lost = true;
    let adapter = ScriptedAdapter::new("scripted");
    let calls = adapter.calls();

    let report = Reconciler::new(sales_catalog(&fixture), ReconcileConfig::new("denodo"))
        .with_adapter(Box::new(adapter))
        .run()
        .await
        .unwrap();

    assert!(calls.lock().unwrap().is_empty());
    let summary = report.summary("scripted").unwrap();
    assert_level_counts(summary, EntityLevel::Schema, 0, 1);
    assert_level_counts(summary, EntityLevel::Table, 0, 1);
    assert_level_counts(summary, EntityLevel::Column, 0, 2);
}

#[tokio::test]
async fn non_ascii_names_gate_tables_but_not_schemas() {
    let schema = AssetBuilder::schema("db-1", "売上db")
        .service("denodo")
        .description("Sales")
        .children(&["tbl-1"])
        .build();
    let table = AssetBuilder::table("tbl-1", "orders")
        .service("denodo")
        .description("Orders")
        .ancestor(layer::SCHEMA3, "db-1", "売上db")
        .children(&["col-1"])
        .build();
    let column = AssetBuilder::column("col-1", "amount")
        .service("denodo")
        .description("Amount")
        .ancestor(layer::SCHEMA3, "db-1", "売上db")
        .ancestor(layer::TABLE, "tbl-1", "orders")
        .build();
    let catalog = RecordingCatalog::new();
    catalog.push_root_page(vec![schema.clone()], "");
    catalog.insert_all([schema, table, column]);

    let mut adapter = ScriptedAdapter::new("scripted");
    adapter.ascii_only = true;
    let calls = adapter.calls();

    let report = Reconciler::new(Arc::new(catalog), ReconcileConfig::new("denodo"))
        .with_adapter(Box::new(adapter))
        .run()
        .await
        .unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![Call::Schema("売上db".into())]);
    let summary = report.summary("scripted").unwrap();
    assert_level_counts(summary, EntityLevel::Schema, 1, 0);
    assert_level_counts(summary, EntityLevel::Table, 0, 1);
    assert_level_counts(summary, EntityLevel::Column, 0, 1);
}

#[tokio::test]
async fn failed_schema_stops_the_run_before_tables() {
    let mut adapter = ScriptedAdapter::new("scripted");
    adapter.schema_outcome = UpdateOutcome::Failed {
        kind: ErrorKind::Other,
        message: "boom".into(),
    };
    let calls = adapter.calls();

    let err = sales_reconciler()
        .with_adapter(Box::new(adapter))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.phase(), Phase::ReconcileSchemas);
    assert!(err.to_string().contains("sales_db"), "{err}");
    assert_eq!(*calls.lock().unwrap(), vec![Call::Schema("sales_db".into())]);
}

#[tokio::test]
async fn skipped_schema_does_not_stop_the_run() {
    let mut adapter = ScriptedAdapter::new("scripted");
    adapter.schema_outcome = UpdateOutcome::Skipped(SkipReason::PermissionDenied);
    let calls = adapter.calls();

    sales_reconciler()
        .with_adapter(Box::new(adapter))
        .run()
        .await
        .unwrap();

    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn adapters_run_in_order_over_one_tree() {
    let catalog = sales_catalog(&SalesFixture::new("denodo", false));
    let first = ScriptedAdapter::new("first");
    let second = ScriptedAdapter::new("second");
    let second_calls = second.calls();

    let report = Reconciler::new(catalog.clone(), ReconcileConfig::new("denodo"))
        .with_adapter(Box::new(first))
        .with_adapter(Box::new(second))
        .run()
        .await
        .unwrap();

    let systems: Vec<&str> = report.systems.iter().map(|(name, _)| *name).collect();
    assert_eq!(systems, vec!["first", "second"]);
    assert_eq!(second_calls.lock().unwrap().len(), 2);
    assert_eq!(report.total_updated(), 6);
    assert_eq!(catalog.cursors(), vec![String::new()]);
    assert!(report.to_string().starts_with("first: schemas 1/0"));
}

#[tokio::test]
async fn a_run_without_adapters_is_a_configuration_error() {
    let err = sales_reconciler()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)), "{err:?}");
}

#[tokio::test]
async fn an_empty_service_is_rejected() {
    let catalog = sales_catalog(&SalesFixture::new("denodo", false));
    let err = Reconciler::new(catalog, ReconcileConfig::new(" "))
        .with_adapter(Box::new(ScriptedAdapter::new("scripted")))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)), "{err:?}");
}

#[tokio::test]
async fn catalog_failures_surface_before_any_write() {
    let catalog = RecordingCatalog::new();
    SalesFixture::new("denodo", false).load_into(&catalog);
    catalog.fail_on_id("tbl-1");
    let adapter = ScriptedAdapter::new("scripted");
    let calls = adapter.calls();

    let err = Reconciler::new(Arc::new(catalog), ReconcileConfig::new("denodo"))
        .with_adapter(Box::new(adapter))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Catalog(_)), "{err:?}");
    assert_eq!(err.phase(), Phase::AssembleTree);
    assert!(calls.lock().unwrap().is_empty());
}
