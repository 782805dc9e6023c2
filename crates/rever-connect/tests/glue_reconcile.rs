//! Reconciliation runs against the in-memory Glue catalog.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use rever_connect::glue::memory::{GlueWrite, InMemoryGlue};
use rever_connect::glue::{CONTAINER_DEPTH, GlueAdapter, SYSTEM};
use rever_connect::{Error, Phase, Reconciler, RunReport};
use rever_core::{EntityLevel, ErrorKind, OverwriteMode, ReconcileConfig, RunSummary};
use rever_test_utils::{RecordingCatalog, SalesFixture, assert_level_counts, init_test_logging};

fn sales_glue() -> Arc<InMemoryGlue> {
    let glue = Arc::new(InMemoryGlue::new());
    glue.add_database("sales_db", None);
    glue.add_table(
        "sales_db",
        "orders",
        None,
        &[("amount", None), ("currency", None)],
    );
    glue
}

fn catalog_with(fixture: &SalesFixture) -> RecordingCatalog {
    let catalog = RecordingCatalog::new();
    fixture.load_into(&catalog);
    catalog
}

async fn run(
    catalog: &RecordingCatalog,
    glue: &Arc<InMemoryGlue>,
    config: ReconcileConfig,
) -> rever_connect::Result<RunReport> {
    Reconciler::new(Arc::new(catalog.clone()), config)
        .with_adapter(Box::new(GlueAdapter::new(Arc::clone(glue))))
        .with_container_depth(CONTAINER_DEPTH)
        .run()
        .await
}

fn summary(report: &RunReport) -> &RunSummary {
    report.summary(SYSTEM).expect("glue summary")
}

#[tokio::test]
async fn first_run_marks_descriptions_and_second_run_is_a_no_op() {
    init_test_logging();
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = sales_glue();

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    assert_eq!(
        glue.database_description("sales_db").as_deref(),
        Some("【QDIC】Sales data")
    );
    let table = glue.table("sales_db", "orders").unwrap();
    assert_eq!(table.description(), Some("【QDIC】Orders table"));
    assert_eq!(
        glue.column_comment("sales_db", "orders", "amount").as_deref(),
        Some("【QDIC】Order amount")
    );
    assert_eq!(glue.column_comment("sales_db", "orders", "currency"), None);
    assert_eq!(
        glue.writes(),
        vec![
            GlueWrite::Database("sales_db".into()),
            GlueWrite::Table("sales_db.orders".into()),
        ]
    );
    let first = summary(&report);
    assert_level_counts(first, EntityLevel::Schema, 1, 0);
    assert_level_counts(first, EntityLevel::Table, 1, 0);
    assert_level_counts(first, EntityLevel::Column, 1, 1);

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    assert_eq!(glue.writes().len(), 2, "rerun must not write");
    let second = summary(&report);
    assert_eq!(second.total_updated(), 0);
    assert_level_counts(second, EntityLevel::Schema, 0, 1);
    assert_level_counts(second, EntityLevel::Table, 0, 1);
    assert_level_counts(second, EntityLevel::Column, 0, 2);
}

#[tokio::test]
async fn user_text_survives_if_empty_and_is_replaced_in_all_mode() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = Arc::new(InMemoryGlue::new());
    glue.add_database("sales_db", Some("curated by hand"));

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();
    assert_eq!(
        glue.database_description("sales_db").as_deref(),
        Some("curated by hand")
    );
    assert_level_counts(summary(&report), EntityLevel::Schema, 0, 1);

    let config = ReconcileConfig::new("athena").with_overwrite_mode(OverwriteMode::All);
    let report = run(&catalog, &glue, config).await.unwrap();
    assert_eq!(
        glue.database_description("sales_db").as_deref(),
        Some("【QDIC】Sales data")
    );
    assert_level_counts(summary(&report), EntityLevel::Schema, 1, 0);
}

#[tokio::test]
async fn empty_string_description_counts_as_empty() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = Arc::new(InMemoryGlue::new());
    glue.add_database("sales_db", Some(""));

    run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    assert_eq!(
        glue.database_description("sales_db").as_deref(),
        Some("【QDIC】Sales data")
    );
}

#[tokio::test]
async fn missing_table_is_skipped_and_the_run_completes() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = Arc::new(InMemoryGlue::new());
    glue.add_database("sales_db", None);

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    let summary = summary(&report);
    assert_eq!(summary.tables.not_found, 1);
    assert_eq!(summary.columns.not_found, 1);
    assert_eq!(glue.writes(), vec![GlueWrite::Database("sales_db".into())]);
}

#[tokio::test]
async fn database_missing_from_glue_is_skipped_and_the_run_completes() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = Arc::new(InMemoryGlue::new());
    glue.add_database("hr", None);
    glue.add_table("hr", "people", None, &[("name", None)]);

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    let summary = summary(&report);
    assert_eq!(summary.schemas.not_found, 1);
    assert_eq!(summary.tables.not_found, 1);
    assert_eq!(summary.columns.not_found, 1);
    assert!(glue.writes().is_empty());
}

#[tokio::test]
async fn permission_denied_database_is_skipped() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = sales_glue();
    glue.fail_on("sales_db", ErrorKind::PermissionDenied);

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    let summary = summary(&report);
    assert_eq!(summary.schemas.permission_denied, 1);
    assert_eq!(summary.tables.updated, 1, "tables continue after a skipped database");
}

#[tokio::test]
async fn fatal_table_error_aborts_with_phase_and_entity() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = sales_glue();
    glue.fail_on("sales_db.orders", ErrorKind::Other);

    let err = run(&catalog, &glue, ReconcileConfig::new("athena"))
        .await
        .unwrap_err();

    match &err {
        Error::Aborted {
            system,
            phase,
            entity,
            kind,
            ..
        } => {
            assert_eq!(*system, SYSTEM);
            assert_eq!(*phase, Phase::ReconcileTables);
            assert_eq!(entity, "sales_db.orders");
            assert_eq!(*kind, ErrorKind::Other);
        }
        other => panic!("expected an aborted run, got {other:?}"),
    }
    assert_eq!(err.phase(), Phase::ReconcileTables);
    assert_eq!(glue.writes(), vec![GlueWrite::Database("sales_db".into())]);
}

#[tokio::test]
async fn lost_table_is_never_written() {
    let mut fixture = SalesFixture::new("athena", true);
    fixture.table.is_lost = true;
    let catalog = catalog_with(&fixture);
    let glue = sales_glue();

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    assert_eq!(glue.writes(), vec![GlueWrite::Database("sales_db".into())]);
    let summary = summary(&report);
    assert_level_counts(summary, EntityLevel::Table, 0, 1);
    assert_level_counts(summary, EntityLevel::Column, 0, 2);
}

#[tokio::test]
async fn columns_are_written_when_the_table_description_is_empty() {
    let mut fixture = SalesFixture::new("athena", true);
    fixture.table.description.clear();
    let catalog = catalog_with(&fixture);
    let glue = sales_glue();

    run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    let table = glue.table("sales_db", "orders").unwrap();
    assert_eq!(table.description(), None);
    assert_eq!(
        glue.column_comment("sales_db", "orders", "amount").as_deref(),
        Some("【QDIC】Order amount")
    );
}

#[tokio::test]
async fn databases_outside_the_allow_list_are_untouched() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = sales_glue();
    let config =
        ReconcileConfig::new("athena").with_database_allow_list(Some(vec!["finance".into()]));

    let report = run(&catalog, &glue, config).await.unwrap();

    assert!(glue.writes().is_empty());
    assert_eq!(summary(&report).total_updated(), 0);
}

#[tokio::test]
async fn database_listing_follows_pagination() {
    let catalog = catalog_with(&SalesFixture::new("athena", true));
    let glue = Arc::new(InMemoryGlue::new().with_page_size(1));
    glue.add_database("alpha", None);
    glue.add_database("beta", None);
    glue.add_database("sales_db", None);

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    assert_eq!(
        glue.database_description("sales_db").as_deref(),
        Some("【QDIC】Sales data")
    );
    assert_level_counts(summary(&report), EntityLevel::Schema, 1, 0);
}

#[tokio::test]
async fn other_services_are_ignored() {
    let catalog = catalog_with(&SalesFixture::new("bigquery", true));
    let glue = sales_glue();

    let report = run(&catalog, &glue, ReconcileConfig::new("athena")).await.unwrap();

    assert!(glue.writes().is_empty());
    assert_eq!(report.total_updated(), 0);
}
