use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, AnalyzeRequest, RawAnalysisResponse, SchemaError, WireItem};

#[derive(Debug, Error)]
pub enum AnalysisClientError {
    #[error("cannot reach analysis endpoint at {0}")]
    Connection(String),

    #[error("analysis request timed out after {0}s")]
    Timeout(u64),

    #[error("analysis endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("analysis reply is not valid JSON: {0}")]
    ResponseParsing(String),

    #[error("analysis reply failed validation: {0}")]
    Schema(#[from] SchemaError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Anything that can score a finalized list of bill items.
pub trait AnalysisBackend: Send + Sync {
    fn analyze<'a>(
        &'a self,
        items: &'a [WireItem],
    ) -> BoxFuture<'a, Result<AnalysisResult, AnalysisClientError>>;
}

/// Client for the external `POST /analyze` endpoint. One attempt per call.
pub struct HttpAnalysisClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AnalysisClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisClientError> {
        Self::new(&config.base_url, config.timeout_secs)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/analyze", self.base_url)
    }

    async fn post_items(&self, items: &[WireItem]) -> Result<AnalysisResult, AnalysisClientError> {
        let url = self.endpoint();
        let body = AnalyzeRequest {
            items: items.to_vec(),
        };

        tracing::debug!("POST {} with {} items", url, items.len());
        let start = std::time::Instant::now();

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                AnalysisClientError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                AnalysisClientError::Timeout(self.timeout_secs)
            } else {
                AnalysisClientError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Analysis endpoint returned {} after {:?}", status, start.elapsed());
            return Err(AnalysisClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: RawAnalysisResponse = response
            .json()
            .await
            .map_err(|e| AnalysisClientError::ResponseParsing(e.to_string()))?;
        let result = raw.validate()?;

        tracing::info!(
            "Analysis returned {} classified items, {} anomalies in {:?}",
            result.classified_items.len(),
            result.anomalies.len(),
            start.elapsed()
        );
        Ok(result)
    }
}

impl AnalysisBackend for HttpAnalysisClient {
    fn analyze<'a>(
        &'a self,
        items: &'a [WireItem],
    ) -> BoxFuture<'a, Result<AnalysisResult, AnalysisClientError>> {
        self.post_items(items).boxed()
    }
}
