//! REST client for the Denodo Data Catalog's local metadata.

use serde::{Deserialize, Serialize};

use rever_core::{Redacted, RetryPolicy};

use super::LOCAL_SYSTEM;
use crate::error::TargetError;
use crate::http::RestTransport;

/// Description type the data catalog stores.
pub const RICH_TEXT: &str = "RICH_TEXT";

/// Connection settings.
#[derive(Debug, Clone)]
pub struct LocalClientConfig {
    /// `https://{host}:{port}/denodo-data-catalog`, without a trailing slash.
    pub base_url: String,
    /// Basic-auth user name.
    pub username: String,
    /// Basic-auth password.
    pub password: Redacted<String>,
    /// Retry policy for every request.
    pub retry: RetryPolicy,
}

impl LocalClientConfig {
    /// Builds the data catalog URL for `host` and `port`.
    #[must_use]
    pub fn new(host: &str, port: u16, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_base_url(
            format!("https://{host}:{port}/denodo-data-catalog"),
            username,
            password,
        )
    }

    /// Uses `base_url` as is.
    #[must_use]
    pub fn with_base_url(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: Redacted::new(password.into()),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// A local database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDatabase {
    /// Numeric ID used for updates.
    pub database_id: i64,
    /// Database name.
    pub database_name: String,
    /// Description; empty when unset.
    #[serde(default)]
    pub database_description: Option<String>,
}

/// Details of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalViewDetail {
    /// Numeric ID used for updates.
    pub id: i64,
    /// View name.
    pub name: String,
    /// Owning database.
    #[serde(default)]
    pub database_name: String,
    /// Whether the catalog keeps a local, editable copy.
    #[serde(default)]
    pub in_local: bool,
    /// Description; empty when unset.
    #[serde(default)]
    pub description: Option<String>,
}

/// One field of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalField {
    /// Field name.
    pub name: String,
    /// Description; empty when unset.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the catalog keeps a local, editable copy.
    #[serde(default)]
    pub in_local: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PutDatabase<'a> {
    database_id: i64,
    description: &'a str,
    description_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PutView<'a> {
    id: i64,
    description: &'a str,
    description_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PutField<'a> {
    database_name: &'a str,
    field_description: &'a str,
    field_name: &'a str,
    view_name: &'a str,
}

/// Client for the data catalog's public API.
#[derive(Debug)]
pub struct DenodoLocalClient {
    transport: RestTransport,
    config: LocalClientConfig,
}

impl DenodoLocalClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: LocalClientConfig) -> Result<Self, TargetError> {
        let transport = RestTransport::new(LOCAL_SYSTEM, config.retry)?;
        Ok(Self { transport, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/public/api{path}", self.config.base_url)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.config.username, Some(self.config.password.expose()))
    }

    /// Lists local databases.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn databases(&self) -> Result<Vec<LocalDatabase>, TargetError> {
        let url = self.url("/database-management/local/databases");
        self.transport
            .json("get_local_databases", |c| self.auth(c.get(&url)))
            .await
    }

    /// Replaces a database description.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn update_database(&self, database_id: i64, description: &str) -> Result<(), TargetError> {
        let url = self.url("/database-management/local/database");
        let body = PutDatabase {
            database_id,
            description,
            description_type: RICH_TEXT,
        };
        self.transport
            .send("put_local_database", |c| self.auth(c.put(&url)).json(&body))
            .await
    }

    /// Reads one view.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn view_details(&self, database: &str, view: &str) -> Result<LocalViewDetail, TargetError> {
        let url = self.url("/view-details");
        let query = [("databaseName", database), ("viewName", view)];
        self.transport
            .json("get_view_details", |c| self.auth(c.get(&url)).query(&query))
            .await
    }

    /// Replaces a view description.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn update_view(&self, id: i64, description: &str) -> Result<(), TargetError> {
        let url = self.url("/views");
        let body = PutView {
            id,
            description,
            description_type: RICH_TEXT,
        };
        self.transport
            .send("put_local_view", |c| self.auth(c.put(&url)).json(&body))
            .await
    }

    /// Lists the fields of one view.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn view_fields(&self, database: &str, view: &str) -> Result<Vec<LocalField>, TargetError> {
        let url = self.url("/views/fields");
        let query = [("databaseName", database), ("viewName", view)];
        self.transport
            .json("get_view_fields", |c| self.auth(c.get(&url)).query(&query))
            .await
    }

    /// Replaces a field description.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    pub async fn update_field(
        &self,
        database: &str,
        view: &str,
        field: &str,
        description: &str,
    ) -> Result<(), TargetError> {
        let url = self.url("/views/fields");
        let body = PutField {
            database_name: database,
            field_description: description,
            field_name: field,
            view_name: view,
        };
        self.transport
            .send("put_local_view_field", |c| self.auth(c.put(&url)).json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_from_host_and_port() {
        let config = LocalClientConfig::new("denodo.internal", 9443, "svc", "pw");
        assert_eq!(config.base_url, "https://denodo.internal:9443/denodo-data-catalog");
        assert!(!format!("{config:?}").contains("\"pw\""));
    }

    #[test]
    fn null_description_decodes() {
        let db: LocalDatabase = serde_json::from_str(
            r#"{"databaseId":3,"databaseName":"sales_db","databaseDescription":null,"serverId":1}"#,
        )
        .unwrap();
        assert_eq!(db.database_id, 3);
        assert_eq!(db.database_description, None);
    }

    #[test]
    fn field_update_body_uses_camel_case() {
        let body = PutField {
            database_name: "sales_db",
            field_description: "x",
            field_name: "amount",
            view_name: "orders",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["fieldName"], "amount");
        assert_eq!(json["viewName"], "orders");
    }
}
