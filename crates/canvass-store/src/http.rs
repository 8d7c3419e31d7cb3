// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the blob endpoint holding the shared document.
//!
//! Each call is a single bounded attempt: there is no retry here, because a
//! retried write computed against a stale fetch is exactly what the console
//! must avoid. Retrying is the console's job and always covers the whole
//! fetch-merge-write cycle.

use std::time::Duration;

use async_trait::async_trait;
use canvass_config::model::{StoreConfig, WriteMethod};
use canvass_core::{CanvassError, Document, DocumentStore};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

/// Longest response body excerpt carried in an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// [`DocumentStore`] backed by a single GET/POST (or PUT) endpoint.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    url: String,
    write_method: WriteMethod,
}

impl HttpDocumentStore {
    /// Builds a client from the `[store]` config section.
    pub fn new(config: &StoreConfig) -> Result<Self, CanvassError> {
        let url = config.url.trim();
        if url.is_empty() {
            return Err(CanvassError::Config(
                "store.url is not set (use canvass.toml or CANVASS_STORE_URL)".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CanvassError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            write_method: config.write_method,
        })
    }

    /// The endpoint this store reads and writes.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_document(&self) -> Result<Document, CanvassError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| transport_error("fetch", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!(url = %self.url, "store has no document yet, starting from defaults");
            return Ok(Document::default());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "store rejected fetch");
            return Err(status_error("fetch", status, &body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error("fetch", e))?;
        debug!(%status, bytes = body.len(), "fetched document");

        Document::from_json_slice(&body)
            .map_err(|e| CanvassError::store("store returned a malformed document", e))
    }

    async fn replace_document(&self, document: &Document) -> Result<(), CanvassError> {
        let body = serde_json::to_vec(document)
            .map_err(|e| CanvassError::Internal(format!("failed to serialize document: {e}")))?;

        let request = match self.write_method {
            WriteMethod::Post => self.client.post(&self.url),
            WriteMethod::Put => self.client.put(&self.url),
        };
        let response = request
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error("replace", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "store rejected replace");
            return Err(status_error("replace", status, &body));
        }

        debug!(%status, "replaced document");
        Ok(())
    }
}

fn transport_error(op: &str, e: reqwest::Error) -> CanvassError {
    let message = if e.is_timeout() {
        format!("{op} timed out")
    } else {
        format!("{op} request failed: {e}")
    };
    warn!(op, error = %e, "store call failed");
    CanvassError::store(message, e)
}

fn status_error(op: &str, status: StatusCode, body: &str) -> CanvassError {
    let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
    CanvassError::StoreUnavailable {
        message: format!("{op} returned {status}: {excerpt}"),
        source: None,
    }
}
