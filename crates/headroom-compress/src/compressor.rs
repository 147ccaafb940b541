//! Transform engine reached over HTTP

use crate::engine::{EngineRequest, EngineResult, TransformEngine};
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;

/// Posts each request as JSON to a transform service and classifies the
/// JSON body it returns
pub struct HttpTransformEngine {
    client: reqwest::Client,
    url: String,
}

impl HttpTransformEngine {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransformEngine for HttpTransformEngine {
    fn name(&self) -> &str {
        "http"
    }

    async fn apply(&self, request: EngineRequest) -> Result<EngineResult, PipelineError> {
        let response = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Engine(format!(
                "{} returned {}: {}",
                self.url,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: serde_json::Value = response.json().await?;
        EngineResult::from_value(body)
    }
}
