//! Shared REST plumbing for the HTTP-based adapters.
//!
//! Requests are rebuilt for every attempt and retried under the transport's
//! [`RetryPolicy`]. Final failures are classified by status code.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use rever_core::RetryPolicy;
use rever_core::retry::is_transient_status;

use crate::error::TargetError;

/// Per-request timeout for target REST APIs.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A single failed attempt.
#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpFailure {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl HttpFailure {
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_builder(),
            Self::Status { status, .. } => is_transient_status(status.as_u16()),
            Self::Decode(_) => false,
        }
    }

    fn classify(self, system: &'static str, operation: &str) -> TargetError {
        let message = format!("{operation}: {self}");
        let error = match &self {
            Self::Status { status, .. } => match *status {
                StatusCode::NOT_FOUND => TargetError::not_found(system, message),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    TargetError::permission_denied(system, message)
                }
                _ => TargetError::other(system, message),
            },
            Self::Decode(_) => TargetError::malformed(system, message),
            Self::Transport(_) => TargetError::other(system, message),
        };
        error.with_source(self)
    }
}

/// A reqwest client bound to one target system and retry policy.
#[derive(Debug, Clone)]
pub(crate) struct RestTransport {
    client: Client,
    retry: RetryPolicy,
    system: &'static str,
}

impl RestTransport {
    pub(crate) fn new(system: &'static str, retry: RetryPolicy) -> Result<Self, TargetError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                TargetError::other(system, "failed to create HTTP client").with_source(e)
            })?;
        Ok(Self {
            client,
            retry,
            system,
        })
    }

    /// Sends the request built by `build` and decodes a JSON body.
    pub(crate) async fn json<T, F>(&self, operation: &str, build: F) -> Result<T, TargetError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let (build, client) = (&build, &self.client);
        self.retry
            .run(operation, HttpFailure::is_transient, move || async move {
                let response = Self::send_once(build(client)).await?;
                response.json::<T>().await.map_err(HttpFailure::Decode)
            })
            .await
            .map_err(|e| e.classify(self.system, operation))
    }

    /// Sends the request built by `build` and discards the body.
    pub(crate) async fn send<F>(&self, operation: &str, build: F) -> Result<(), TargetError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let (build, client) = (&build, &self.client);
        self.retry
            .run(operation, HttpFailure::is_transient, move || async move {
                Self::send_once(build(client)).await.map(drop)
            })
            .await
            .map_err(|e| e.classify(self.system, operation))
    }

    async fn send_once(request: RequestBuilder) -> Result<reqwest::Response, HttpFailure> {
        let response = request.send().await.map_err(HttpFailure::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(HttpFailure::Status { status, body })
    }
}
