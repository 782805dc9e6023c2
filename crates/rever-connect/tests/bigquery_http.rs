//! BigQuery and Data Catalog REST behaviour against a mock server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use rever_connect::bigquery::{
    BigQueryAdapter, BigQueryClient, BigQueryConfig, CONTAINER_DEPTH, SYSTEM, StaticToken,
};
use rever_connect::{Error, Phase, Reconciler, RunReport};
use rever_core::{EntityLevel, ReconcileConfig, RetryPolicy};
use rever_test_utils::{RecordingCatalog, SalesFixture, assert_level_counts};

const DATASET_PATH: &str = "/bigquery/v2/projects/my-project/datasets/sales_db";
const TABLE_PATH: &str = "/bigquery/v2/projects/my-project/datasets/sales_db/tables/orders";
const ENTRY_NAME: &str =
    "projects/my-project/locations/asia-northeast1/entryGroups/@bigquery/entries/e1";

async fn run(server: &ServerGuard) -> rever_connect::Result<RunReport> {
    let catalog = RecordingCatalog::new();
    SalesFixture::new("bigquery", true).load_into(&catalog);
    let config = BigQueryConfig::new("fallback-project")
        .with_base_url(&server.url())
        .with_retry(RetryPolicy::no_retry());
    let client = BigQueryClient::new(config, Box::new(StaticToken::new("test-token"))).unwrap();
    Reconciler::new(Arc::new(catalog), ReconcileConfig::new("bigquery"))
        .with_adapter(Box::new(BigQueryAdapter::new(client)))
        .with_container_depth(CONTAINER_DEPTH)
        .run()
        .await
}

fn table_body() -> serde_json::Value {
    json!({
        "tableReference": {"projectId": "my-project", "datasetId": "sales_db", "tableId": "orders"},
        "location": "asia-northeast1",
        "schema": {"fields": [
            {"name": "amount", "type": "NUMERIC", "mode": "NULLABLE"},
            {"name": "currency", "type": "STRING", "description": "ISO code"}
        ]}
    })
}

async fn mock_entry_lookup(server: &mut ServerGuard, overview: Option<&str>) -> mockito::Mock {
    let mut body = json!({"name": ENTRY_NAME});
    if let Some(overview) = overview {
        body["businessContext"] = json!({"entryOverview": {"overview": overview}});
    }
    server
        .mock("GET", "/v1/entries:lookup")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "fullyQualifiedName".into(),
                "bigquery:my-project.sales_db.orders".into(),
            ),
            Matcher::UrlEncoded("project".into(), "my-project".into()),
            Matcher::UrlEncoded("location".into(), "asia-northeast1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn dataset_table_columns_and_overview_are_written() {
    let mut server = Server::new_async().await;

    let get_dataset = server
        .mock("GET", DATASET_PATH)
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"datasetReference": {"projectId": "my-project", "datasetId": "sales_db"}})
                .to_string(),
        )
        .create_async()
        .await;
    let put_dataset = server
        .mock("PUT", DATASET_PATH)
        .match_body(Matcher::Json(json!({
            "datasetReference": {"projectId": "my-project", "datasetId": "sales_db"},
            "description": "【QDIC】Sales data"
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let get_table = server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(table_body().to_string())
        .create_async()
        .await;
    let put_table = server
        .mock("PUT", TABLE_PATH)
        .match_body(Matcher::Json(json!({
            "tableReference": {"projectId": "my-project", "datasetId": "sales_db", "tableId": "orders"},
            "location": "asia-northeast1",
            "schema": {"fields": [
                {"name": "amount", "type": "NUMERIC", "mode": "NULLABLE", "description": "【QDIC】Order amount"},
                {"name": "currency", "type": "STRING", "description": "ISO code"}
            ]}
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let lookup = mock_entry_lookup(&mut server, None).await;
    let modify = server
        .mock("POST", format!("/v1/{ENTRY_NAME}:modifyEntryOverview").as_str())
        .match_body(Matcher::Json(json!({"entryOverview": {"overview": "【QDIC】Orders table"}})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let report = run(&server).await.unwrap();

    for mock in [get_dataset, put_dataset, get_table, put_table, lookup, modify] {
        mock.assert_async().await;
    }
    let summary = report.summary(SYSTEM).unwrap();
    assert_level_counts(summary, EntityLevel::Schema, 1, 0);
    assert_level_counts(summary, EntityLevel::Table, 1, 0);
    assert_level_counts(summary, EntityLevel::Column, 1, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn marked_resources_are_not_written_again() {
    let mut server = Server::new_async().await;

    let _get_dataset = server
        .mock("GET", DATASET_PATH)
        .with_status(200)
        .with_body(json!({"description": "【QDIC】Sales data"}).to_string())
        .create_async()
        .await;
    let put_dataset = server
        .mock("PUT", DATASET_PATH)
        .expect(0)
        .create_async()
        .await;
    let mut body = table_body();
    body["schema"]["fields"][0]["description"] = json!("【QDIC】Order amount");
    let _get_table = server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;
    let put_table = server.mock("PUT", TABLE_PATH).expect(0).create_async().await;
    let _lookup = mock_entry_lookup(&mut server, Some("<p>【QDIC】Orders table</p>")).await;
    let modify = server
        .mock("POST", Matcher::Regex(":modifyEntryOverview$".into()))
        .expect(0)
        .create_async()
        .await;

    let report = run(&server).await.unwrap();

    put_dataset.assert_async().await;
    put_table.assert_async().await;
    modify.assert_async().await;
    assert_eq!(report.total_updated(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn forbidden_dataset_is_skipped() {
    let mut server = Server::new_async().await;

    let _get_dataset = server
        .mock("GET", DATASET_PATH)
        .with_status(403)
        .with_body(r#"{"error": {"code": 403, "message": "Access Denied"}}"#)
        .create_async()
        .await;
    let _get_table = server
        .mock("GET", TABLE_PATH)
        .with_status(404)
        .with_body(r#"{"error": {"code": 404}}"#)
        .create_async()
        .await;

    let report = run(&server).await.unwrap();

    let summary = report.summary(SYSTEM).unwrap();
    assert_eq!(summary.schemas.permission_denied, 1);
    assert_eq!(summary.tables.not_found, 1);
    assert_eq!(summary.columns.not_found, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn server_error_on_column_write_aborts_the_run() {
    let mut server = Server::new_async().await;

    let _get_dataset = server
        .mock("GET", DATASET_PATH)
        .with_status(200)
        .with_body(json!({"description": "【QDIC】Sales data"}).to_string())
        .create_async()
        .await;
    let _get_table = server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_body(table_body().to_string())
        .create_async()
        .await;
    let _put_table = server
        .mock("PUT", TABLE_PATH)
        .with_status(500)
        .with_body("backend error")
        .create_async()
        .await;
    let lookup = server
        .mock("GET", "/v1/entries:lookup")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = run(&server).await.unwrap_err();

    match err {
        Error::Aborted { system, phase, entity, .. } => {
            assert_eq!(system, SYSTEM);
            assert_eq!(phase, Phase::ReconcileColumns);
            assert_eq!(entity, "sales_db.orders.amount");
        }
        other => panic!("expected an aborted run, got {other:?}"),
    }
    lookup.assert_async().await;
}
