//! Client for the bulk document indexing endpoint that receives the
//! processed log records.

use async_trait::async_trait;
use http::StatusCode;
use reqwest::header;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The credentials were rejected (`401` or `403`).
    #[error("unauthorized")]
    Unauthorized,
    #[error("Unexpected response from the bulk endpoint: {status}\n{body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Other(anyhow::Error),
}

/// Outcome of an accepted bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResponse {
    pub status: StatusCode,
    /// The `errors` flag of the response body. The endpoint accepts the
    /// request as a whole even if individual documents were rejected.
    pub errors: bool,
    /// Number of documents that were rejected.
    pub failed_items: usize,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait BulkIndexClient: Send + Sync {
    /// Sends a newline delimited bulk request body.
    async fn send_bulk(&self, payload: String) -> Result<BulkResponse, SinkError>;
}

pub struct RealBulkIndexClient {
    client: reqwest::Client,
    url: Url,
    username: String,
    password: SecretString,
}

impl RealBulkIndexClient {
    pub fn new(
        client: reqwest::Client,
        url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            client,
            url,
            username: username.into(),
            password,
        }
    }
}

#[async_trait]
impl BulkIndexClient for RealBulkIndexClient {
    async fn send_bulk(&self, payload: String) -> Result<BulkResponse, SinkError> {
        debug!(url = %self.url, bytes = payload.len(), "Sending bulk request…");

        let response = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .body(payload)
            .send()
            .await
            .map_err(|err| SinkError::Other(err.into()))?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|err| SinkError::Other(err.into()))?;

                Ok(parse_response(status, &body))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SinkError::Unauthorized),
            _ => Err(SinkError::UnexpectedStatus {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, ItemResult>>,
}

#[derive(Deserialize)]
struct ItemResult {
    error: Option<serde_json::Value>,
}

fn parse_response(status: StatusCode, body: &str) -> BulkResponse {
    let body = match serde_json::from_str::<ResponseBody>(body) {
        Ok(body) => body,
        Err(error) => {
            warn!(%status, "Failed to parse bulk response body: {error}");
            return BulkResponse {
                status,
                errors: false,
                failed_items: 0,
            };
        }
    };

    let failed_items = body
        .items
        .iter()
        .flat_map(|item| item.values())
        .filter(|result| result.error.is_some())
        .count();

    BulkResponse {
        status,
        errors: body.errors,
        failed_items,
    }
}
