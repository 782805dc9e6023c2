//! HTTP client for the catalog API.
//!
//! Authenticates with OAuth2 client credentials and caches the access token
//! until shortly before it expires. Every request goes through a
//! [`RetryPolicy`] that retries connection failures and transient statuses.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use rever_core::{Redacted, RetryPolicy};

use crate::asset::CatalogAsset;
use crate::error::{CatalogError, Result};
use crate::source::{AssetPage, CatalogSource};

/// OAuth2 scope requested for the catalog API.
pub const TOKEN_SCOPE: &str = "api.quollio.com/beta:admin";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// OAuth2 client ID.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: Redacted<String>,
    /// Retry policy for every request.
    pub retry: RetryPolicy,
}

impl CatalogClientConfig {
    /// Creates a configuration with the default retry policy.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: Redacted::new(client_secret.into()),
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

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: Redacted<String>,
    refresh_at: Instant,
}

#[derive(Debug, Serialize)]
struct AssetsByTypeRequest<'a> {
    last_id: &'a str,
    object_type: &'a str,
}

#[derive(Debug, Serialize)]
struct AssetsByIdsRequest<'a> {
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct AssetsByIdsResponse {
    #[serde(default)]
    data: Vec<CatalogAsset>,
}

/// Catalog API client.
#[derive(Debug)]
pub struct CatalogClient {
    client: Client,
    config: CatalogClientConfig,
    token: Mutex<Option<CachedToken>>,
}

impl CatalogClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: CatalogClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::transport("failed to create HTTP client", e))?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns a valid access token, fetching a new one when needed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Auth`] if the token endpoint rejects the credentials.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.expose().clone());
            }
        }

        let response: TokenResponse = self
            .config
            .retry
            .run("catalog_token", CatalogError::is_transient, || self.request_token())
            .await?;
        let lifetime = Duration::from_secs(response.expires_in);
        let token = CachedToken {
            value: Redacted::new(response.access_token),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        };
        let value = token.value.expose().clone();
        *cached = Some(token);
        tracing::debug!(expires_in = response.expires_in, "obtained catalog access token");
        Ok(value)
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        let url = format!("{}/oauth2/token", self.config.base_url);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("scope", TOKEN_SCOPE),
        ];
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.expose()))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        if rever_core::retry::is_transient_status(status.as_u16()) {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Err(CatalogError::Auth {
            message: format!("token endpoint returned {status}: {body}"),
        })
    }

    async fn post_json<B, T>(&self, operation: &str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path}", self.config.base_url);
        self.config
            .retry
            .run(operation, CatalogError::is_transient, || {
                self.post_once(&url, body)
            })
            .await
    }

    async fn post_once<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn assets_by_type(&self, object_type: &str, last_id: &str) -> Result<AssetPage> {
        let request = AssetsByTypeRequest {
            last_id,
            object_type,
        };
        self.post_json("assets_by_type", "/v2/assets/type", &request)
            .await
    }

    async fn assets_by_ids(&self, ids: &[String]) -> Result<Vec<CatalogAsset>> {
        let request = AssetsByIdsRequest { ids };
        let response: AssetsByIdsResponse = self
            .post_json("assets_by_ids", "/v2/assets/ids", &request)
            .await?;
        Ok(response.data)
    }
}
