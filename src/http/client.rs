//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Context;
use crate::errors::GhdeployError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated HTTP client for the remote Deployments API
pub struct ApiClient {
    client: Client,
    base_url: String,
    repository: String,
}

impl ApiClient {
    /// Create a new API client from an execution context
    pub fn new(context: &Context) -> Result<Self, GhdeployError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let mut authorization =
            header::HeaderValue::from_str(&format!("Bearer {}", context.credential)).map_err(
                |_| GhdeployError::Config("credential contains invalid header characters".into()),
            )?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);

        let client = Client::builder()
            .user_agent(concat!("ghdeploy/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: context.api_base_url.trim_end_matches('/').to_string(),
            repository: context.repository.clone(),
        })
    }

    /// The `owner/name` repository this client operates on
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Make a GET request
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GhdeployError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        Self::decode(response).await
    }

    /// Make a POST request
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GhdeployError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    /// Map non-success responses onto the error taxonomy, surfacing the
    /// remote message verbatim where one is present.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GhdeployError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = remote_message(&body).unwrap_or_else(|| status.to_string());
        debug!("request failed: {} - {}", status, message);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GhdeployError::Auth(message),
            StatusCode::NOT_FOUND => GhdeployError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => GhdeployError::RateLimited(message),
            _ => GhdeployError::Rejected(message),
        })
    }
}

/// Extract the `message` field the remote API attaches to error payloads
fn remote_message(body: &str) -> Option<String> {
    let payload: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = payload.get("message")?.as_str()?;
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
