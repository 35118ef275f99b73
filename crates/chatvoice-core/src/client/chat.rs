//! Retrieval/LLM chat backend client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_body, http_client};
use crate::config::ChatBackendConfig;
use crate::error::{Error, Result};

/// Answers one user message
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn query(&self, message: &str) -> Result<String>;
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    response: String,
}

/// HTTP client for the retrieval-augmented chat backend
pub struct RagChatClient {
    client: reqwest::Client,
    url: String,
}

impl RagChatClient {
    pub fn new(config: &ChatBackendConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for RagChatClient {
    async fn query(&self, message: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest { message })
            .send()
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Backend(error_body(response).await));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("invalid response: {}", e)))?;
        debug!("Chat backend answered with {} chars", parsed.response.len());
        Ok(parsed.response)
    }
}
