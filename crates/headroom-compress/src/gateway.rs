//! Optional external pipeline with one-shot degrade

use crate::compressor::HttpTransformEngine;
use crate::engine::{EngineRequest, NormalizedResult, PipelinePlan, TransformEngine};
use crate::error::PipelineError;
use headroom_core::{HeadroomConfig, Message};
use std::sync::Arc;
use std::time::Duration;

/// Wraps a transform engine; every failure is returned as a
/// [`PipelineError`] for the caller to degrade on. Nothing is retried.
pub struct PipelineGateway {
    engine: Arc<dyn TransformEngine>,
    plan: PipelinePlan,
    timeout: Duration,
}

impl PipelineGateway {
    pub fn new(engine: Arc<dyn TransformEngine>, plan: PipelinePlan, timeout: Duration) -> Self {
        Self {
            engine,
            plan,
            timeout,
        }
    }

    /// Build a gateway when an engine is available and at least one
    /// transform is enabled
    pub fn from_config(
        config: &HeadroomConfig,
        engine: Option<Arc<dyn TransformEngine>>,
    ) -> Option<Self> {
        let Some(engine) = engine else {
            tracing::warn!("transform engine not available, using basic compression");
            return None;
        };

        let plan = PipelinePlan::from_config(config);
        if plan.is_empty() {
            tracing::info!("no transforms enabled, using basic compression");
            return None;
        }

        tracing::info!(
            engine = engine.name(),
            transforms = plan.transforms.len(),
            provider = plan.provider.as_str(),
            "transform pipeline loaded"
        );
        Some(Self::new(
            engine,
            plan,
            Duration::from_millis(config.pipeline.timeout_ms),
        ))
    }

    /// HTTP engine for `HEADROOM_PIPELINE_URL`, if one is configured
    pub fn engine_from_config(config: &HeadroomConfig) -> Option<Arc<dyn TransformEngine>> {
        let url = config.pipeline.url.as_deref()?;
        match HttpTransformEngine::new(url, Duration::from_millis(config.pipeline.timeout_ms)) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                tracing::warn!(error = %e, url, "failed to build HTTP transform engine");
                None
            }
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    /// Run the engine once, bounded by the configured timeout
    pub async fn apply(
        &self,
        messages: &[Message],
        model: &str,
        model_limit: u64,
    ) -> Result<NormalizedResult, PipelineError> {
        let request = EngineRequest {
            messages: messages.to_vec(),
            model: model.to_string(),
            model_limit,
            plan: self.plan.clone(),
        };

        // Spawned so an engine panic surfaces as a JoinError instead of
        // unwinding through the orchestrator.
        let engine = Arc::clone(&self.engine);
        let mut task = tokio::spawn(async move { engine.apply(request).await });

        let result = match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => return Err(PipelineError::Aborted(join_err.to_string())),
            Err(_) => {
                task.abort();
                return Err(PipelineError::Timeout(self.timeout.as_millis() as u64));
            }
        };

        Ok(result.normalize(messages))
    }
}
