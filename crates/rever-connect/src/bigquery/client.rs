//! REST client for BigQuery and Data Catalog.
//!
//! Resources are modelled only as far as rever reads them; every other
//! field is kept in `extra` so full-resource updates round-trip it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rever_core::RetryPolicy;

use super::SYSTEM;
use super::auth::TokenSource;
use crate::error::TargetError;
use crate::http::RestTransport;

/// Default BigQuery v2 endpoint.
pub const BIGQUERY_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Default Data Catalog v1 endpoint.
pub const DATACATALOG_URL: &str = "https://datacatalog.googleapis.com/v1";

/// Connection settings.
#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    /// BigQuery base URL, without a trailing slash.
    pub bigquery_url: String,
    /// Data Catalog base URL, without a trailing slash.
    pub datacatalog_url: String,
    /// Project used when an asset carries no project ancestor.
    pub default_project: String,
    /// Retry policy for every request.
    pub retry: RetryPolicy,
}

impl BigQueryConfig {
    /// Creates a configuration against the public Google endpoints.
    #[must_use]
    pub fn new(default_project: impl Into<String>) -> Self {
        Self {
            bigquery_url: BIGQUERY_URL.to_string(),
            datacatalog_url: DATACATALOG_URL.to_string(),
            default_project: default_project.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Points both APIs at `base_url`, as a local test server does.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.bigquery_url = format!("{base}/bigquery/v2");
        self.datacatalog_url = format!("{base}/v1");
        self
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// A BigQuery dataset resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// User-visible description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// All other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A top-level schema field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableField {
    /// Column name.
    pub name: String,
    /// Column description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type, mode, nested fields and the rest.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A table schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Top-level fields.
    #[serde(default)]
    pub fields: Vec<TableField>,
    /// All other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A BigQuery table resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Dataset location, e.g. `asia-northeast1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Table schema; views may have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    /// All other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rich-text overview of a Data Catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOverview {
    /// The overview, possibly HTML.
    #[serde(default)]
    pub overview: String,
}

/// Business context of a Data Catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContext {
    /// The entry overview, if set.
    #[serde(default)]
    pub entry_overview: Option<EntryOverview>,
}

/// A Data Catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Resource name, `projects/../locations/../entryGroups/../entries/..`.
    pub name: String,
    /// Business context; absent when no overview was ever written.
    #[serde(default)]
    pub business_context: Option<BusinessContext>,
}

impl Entry {
    /// Returns the overview text, if any business context exists.
    #[must_use]
    pub fn overview(&self) -> Option<&str> {
        self.business_context.as_ref().map(|context| {
            context
                .entry_overview
                .as_ref()
                .map_or("", |o| o.overview.as_str())
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyEntryOverviewRequest<'a> {
    entry_overview: OverviewBody<'a>,
}

#[derive(Debug, Serialize)]
struct OverviewBody<'a> {
    overview: &'a str,
}

/// Client for the BigQuery and Data Catalog REST APIs.
#[derive(Debug)]
pub struct BigQueryClient {
    transport: RestTransport,
    tokens: Box<dyn TokenSource>,
    config: BigQueryConfig,
}

impl BigQueryClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: BigQueryConfig, tokens: Box<dyn TokenSource>) -> Result<Self, TargetError> {
        let transport = RestTransport::new(SYSTEM, config.retry)?;
        Ok(Self {
            transport,
            tokens,
            config,
        })
    }

    /// Returns the project used when an asset names none.
    #[must_use]
    pub fn default_project(&self) -> &str {
        &self.config.default_project
    }

    fn dataset_url(&self, project: &str, dataset: &str) -> String {
        format!(
            "{}/projects/{project}/datasets/{dataset}",
            self.config.bigquery_url
        )
    }

    fn table_url(&self, project: &str, dataset: &str, table: &str) -> String {
        format!("{}/tables/{table}", self.dataset_url(project, dataset))
    }

    /// `datasets.get`
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn get_dataset(&self, project: &str, dataset: &str) -> Result<Dataset, TargetError> {
        let token = self.tokens.token().await?;
        let url = self.dataset_url(project, dataset);
        self.transport
            .json("datasets.get", |c| c.get(&url).bearer_auth(&token))
            .await
    }

    /// `datasets.update`, replacing the whole resource.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn update_dataset(
        &self,
        project: &str,
        dataset: &str,
        resource: &Dataset,
    ) -> Result<(), TargetError> {
        let token = self.tokens.token().await?;
        let url = self.dataset_url(project, dataset);
        self.transport
            .send("datasets.update", |c| {
                c.put(&url).bearer_auth(&token).json(resource)
            })
            .await
    }

    /// `tables.get`
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn get_table(
        &self,
        project: &str,
        dataset: &str,
        table: &str,
    ) -> Result<Table, TargetError> {
        let token = self.tokens.token().await?;
        let url = self.table_url(project, dataset, table);
        self.transport
            .json("tables.get", |c| c.get(&url).bearer_auth(&token))
            .await
    }

    /// `tables.update`, replacing the whole resource.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn update_table(
        &self,
        project: &str,
        dataset: &str,
        table: &str,
        resource: &Table,
    ) -> Result<(), TargetError> {
        let token = self.tokens.token().await?;
        let url = self.table_url(project, dataset, table);
        self.transport
            .send("tables.update", |c| {
                c.put(&url).bearer_auth(&token).json(resource)
            })
            .await
    }

    /// `entries.lookup` by fully qualified name, e.g. `bigquery:p.d.t`.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn lookup_entry(
        &self,
        fully_qualified_name: &str,
        project: &str,
        location: Option<&str>,
    ) -> Result<Entry, TargetError> {
        let token = self.tokens.token().await?;
        let url = format!("{}/entries:lookup", self.config.datacatalog_url);
        let mut query = vec![("fullyQualifiedName", fully_qualified_name), ("project", project)];
        if let Some(location) = location {
            query.push(("location", location));
        }
        self.transport
            .json("entries.lookup", |c| {
                c.get(&url).bearer_auth(&token).query(&query)
            })
            .await
    }

    /// `entries.modifyEntryOverview`
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn modify_entry_overview(
        &self,
        entry_name: &str,
        overview: &str,
    ) -> Result<(), TargetError> {
        let token = self.tokens.token().await?;
        let url = format!(
            "{}/{entry_name}:modifyEntryOverview",
            self.config.datacatalog_url
        );
        let body = ModifyEntryOverviewRequest {
            entry_overview: OverviewBody { overview },
        };
        self.transport
            .send("entries.modifyEntryOverview", |c| {
                c.post(&url).bearer_auth(&token).json(&body)
            })
            .await
    }
}
