use crate::compress::FallbackCompressor;
use crate::error::CompressError;
use crate::gateway::PipelineGateway;
use headroom_core::{CompressRequest, CompressResponse, CompressionStats};
use headroom_telemetry::{estimate_value_tokens, Metrics};
use std::sync::Arc;
use std::time::Instant;

/// Per-request decision logic: gate check, then pipeline or fallback
pub struct CompressionOrchestrator {
    min_tokens: usize,
    gateway: Option<PipelineGateway>,
    fallback: FallbackCompressor,
    metrics: Arc<Metrics>,
}

impl CompressionOrchestrator {
    pub fn new(
        min_tokens: usize,
        gateway: Option<PipelineGateway>,
        fallback: FallbackCompressor,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            min_tokens,
            gateway,
            fallback,
            metrics,
        }
    }

    pub fn pipeline_loaded(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn min_tokens(&self) -> usize {
        self.min_tokens
    }

    /// Compress one conversation. Failures are counted and returned, never
    /// propagated as panics.
    pub async fn compress(&self, request: CompressRequest) -> Result<CompressResponse, CompressError> {
        let start = Instant::now();
        self.metrics.record_request();

        match self.run(request, start).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.metrics.record_error();
                tracing::error!(error = %e, kind = e.kind(), "compression error");
                Err(e)
            }
        }
    }

    async fn run(&self, request: CompressRequest, start: Instant) -> Result<CompressResponse, CompressError> {
        let tokens_before = estimate_value_tokens(&request.messages)?;
        self.metrics.add_tokens_before(tokens_before);

        if tokens_before < self.min_tokens {
            self.metrics.record_skipped();
            self.metrics.add_tokens_after(tokens_before);
            tracing::debug!(tokens_before, min_tokens = self.min_tokens, "below threshold, skipping");
            return Ok(CompressResponse {
                messages: request.messages,
                tools: request.tools,
                compressed: false,
                stats: CompressionStats::skipped(tokens_before, self.min_tokens)
                    .with_latency_ms(elapsed_ms(start)),
            });
        }

        if let Some(gateway) = &self.gateway {
            match gateway
                .apply(&request.messages, &request.model, request.model_limit)
                .await
            {
                Ok(result) => {
                    let tokens_after = estimate_value_tokens(&result.messages)?;
                    self.metrics.add_tokens_after(tokens_after);
                    self.metrics.record_applied();
                    return Ok(CompressResponse {
                        messages: result.messages,
                        tools: request.tools,
                        compressed: tokens_after < tokens_before,
                        stats: CompressionStats::new(
                            tokens_before,
                            tokens_after,
                            result.transforms_applied,
                        )
                        .with_latency_ms(elapsed_ms(start)),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        engine = gateway.engine_name(),
                        "pipeline error, falling back to basic compression"
                    );
                }
            }
        }

        let outcome = self.fallback.compress(&request.messages, request.tools)?;
        self.metrics.add_tokens_after(outcome.stats.tokens_after);
        if outcome.compressed {
            self.metrics.record_applied();
        } else {
            self.metrics.record_skipped();
        }

        Ok(CompressResponse {
            messages: outcome.messages,
            tools: outcome.tools,
            compressed: outcome.compressed,
            stats: outcome.stats.with_latency_ms(elapsed_ms(start)),
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
