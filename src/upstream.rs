use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use crate::json_rpc::JsonRpcRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("fail to reach archive endpoint: {0}")]
    Transport(reqwest::Error),

    #[error("archive endpoint returned status {0}")]
    BadStatus(StatusCode),

    #[error("archive endpoint returned a non-JSON body: {0}")]
    InvalidBody(reqwest::Error),
}

/// JSON-RPC transport to the archive service. The indirection exists so the
/// cache and dispatcher can run against a scripted archive in tests.
#[async_trait]
pub trait ArchiveRpc: Send + Sync {
    /// Sends a single request and returns the response body as-is. No
    /// retries; a failed call surfaces immediately.
    async fn send(&self, request: &JsonRpcRequest) -> Result<Value, UpstreamError>;
}

pub struct ArchiveClient {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl ArchiveClient {
    pub fn new(endpoint: Url) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("fail to create http client")?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

#[async_trait]
impl ArchiveRpc for ArchiveClient {
    async fn send(&self, request: &JsonRpcRequest) -> Result<Value, UpstreamError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus(status));
        }

        response
            .json::<Value>()
            .await
            .map_err(UpstreamError::InvalidBody)
    }
}
