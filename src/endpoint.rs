//! HTTP client for the homework status endpoint.
//!
//! One request per call and no internal retry: scheduling the next attempt
//! is the poller's job.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::errors::CycleError;

/// Source of raw status payloads, queried with a `from_date` cursor.
#[async_trait]
pub trait StatusEndpoint: Send + Sync {
    async fn fetch(&self, since: i64) -> Result<Value, CycleError>;
}

pub struct EndpointClient {
    url: String,
    token: String,
    http: Client,
}

impl EndpointClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            url: url.into(),
            token: token.into(),
            http,
        })
    }
}

#[async_trait]
impl StatusEndpoint for EndpointClient {
    async fn fetch(&self, since: i64) -> Result<Value, CycleError> {
        let resp = self
            .http
            .get(&self.url)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", since)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "status endpoint request failed");
                CycleError::EndpointTransport(e.to_string())
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "status endpoint returned non-200");
            return Err(CycleError::EndpointUnavailable(format!(
                "endpoint returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CycleError::EndpointTransport(format!("failed to read response body: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            CycleError::EndpointUnavailable(format!("response is not valid JSON: {}", e))
        })
    }
}
