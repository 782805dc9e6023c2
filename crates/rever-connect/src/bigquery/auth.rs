//! OAuth2 access tokens for Google APIs.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

use rever_core::Redacted;

use super::SYSTEM;
use crate::error::TargetError;

/// Scope covering BigQuery and Data Catalog.
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Supplies bearer tokens to [`BigQueryClient`](super::BigQueryClient).
#[async_trait]
pub trait TokenSource: Debug + Send + Sync {
    /// Returns a valid access token.
    async fn token(&self) -> Result<String, TargetError>;
}

/// Token source backed by `gcp_auth`.
pub struct GcpTokenSource {
    provider: Arc<dyn TokenProvider>,
}

impl Debug for GcpTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpTokenSource").finish_non_exhaustive()
    }
}

impl GcpTokenSource {
    /// Uses the given service account JSON, or discovers credentials from
    /// the environment when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable credentials are found.
    pub async fn new(service_account_json: Option<&str>) -> Result<Self, TargetError> {
        let provider: Arc<dyn TokenProvider> = match service_account_json {
            Some(json) if !json.trim().is_empty() => Arc::new(
                CustomServiceAccount::from_json(json).map_err(|e| {
                    TargetError::other(SYSTEM, "invalid service account credentials")
                        .with_source(e)
                })?,
            ),
            _ => gcp_auth::provider().await.map_err(|e| {
                TargetError::other(SYSTEM, "failed to initialize GCP authentication")
                    .with_source(e)
            })?,
        };
        Ok(Self { provider })
    }

    /// Project the credentials belong to.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials carry no project.
    pub async fn project_id(&self) -> Result<String, TargetError> {
        self.provider
            .project_id()
            .await
            .map(|id| id.to_string())
            .map_err(|e| TargetError::other(SYSTEM, "credentials carry no project").with_source(e))
    }
}

#[async_trait]
impl TokenSource for GcpTokenSource {
    async fn token(&self) -> Result<String, TargetError> {
        let token = self.provider.token(SCOPES).await.map_err(|e| {
            TargetError::permission_denied(SYSTEM, "failed to get GCP access token").with_source(e)
        })?;
        Ok(token.as_str().to_string())
    }
}

/// A fixed token, for tests and pre-issued credentials.
#[derive(Debug, Clone)]
pub struct StaticToken(Redacted<String>);

impl StaticToken {
    /// Wraps `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Redacted::new(token.into()))
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, TargetError> {
        Ok(self.0.expose().clone())
    }
}
