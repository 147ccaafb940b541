//! Sidecar operations over one shared store

use crate::compress::FallbackCompressor;
use crate::engine::TransformEngine;
use crate::error::CompressError;
use crate::gateway::PipelineGateway;
use crate::orchestrator::CompressionOrchestrator;
use crate::text::{TextCompressRequest, TextCompressResponse, TextCompressor, TEXT_COMPRESSOR_NAME};
use chrono::Utc;
use headroom_ccr::{CcrStore, Expansion};
use headroom_core::{CompressRequest, CompressResponse, ConfigError, HeadroomConfig};
use headroom_telemetry::{Metrics, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

fn default_max_results() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub hash: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub success: bool,
    pub content: Option<Value>,
    pub items_retrieved: usize,
    pub was_search: bool,
    pub error: Option<String>,
}

impl RetrieveResponse {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            content: None,
            items_retrieved: 0,
            was_search: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub query: String,
    #[serde(default)]
    pub turn_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub expansions: Vec<Expansion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRequest {
    pub hash_key: String,
    pub turn_number: u32,
    pub tool_name: String,
    #[serde(default)]
    pub sample: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResponse {
    pub tracked: bool,
    pub hash_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub headroom_loaded: bool,
    pub ccr_enabled: bool,
    pub llmlingua_enabled: bool,
    pub entries_cached: usize,
    pub config: Value,
}

pub struct SidecarBuilder {
    config: HeadroomConfig,
    engine: Option<Arc<dyn TransformEngine>>,
    text_compressor: Option<Arc<dyn TextCompressor>>,
    store: Option<Arc<CcrStore>>,
}

impl SidecarBuilder {
    /// External transform engine; without one every request uses the fallback
    pub fn engine(mut self, engine: Arc<dyn TransformEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn text_compressor(mut self, compressor: Arc<dyn TextCompressor>) -> Self {
        self.text_compressor = Some(compressor);
        self
    }

    /// Use an existing store (e.g. restored from a snapshot); its metrics
    /// handle becomes the sidecar's
    pub fn store(mut self, store: Arc<CcrStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Sidecar {
        let store = self.store.unwrap_or_else(|| {
            Arc::new(CcrStore::new(
                self.config.ccr.ttl_secs,
                Arc::new(Metrics::new()),
            ))
        });
        let metrics = Arc::clone(store.metrics());

        let fallback = if self.config.ccr.enabled {
            FallbackCompressor::new(Arc::clone(&store))
        } else {
            FallbackCompressor::disabled()
        };
        let gateway = PipelineGateway::from_config(&self.config, self.engine);
        let orchestrator = CompressionOrchestrator::new(
            self.config.min_tokens(),
            gateway,
            fallback,
            Arc::clone(&metrics),
        );

        Sidecar {
            config: self.config,
            store,
            metrics,
            orchestrator,
            text_compressor: self.text_compressor,
        }
    }
}

/// All sidecar operations over shared, process-scoped state
pub struct Sidecar {
    config: HeadroomConfig,
    store: Arc<CcrStore>,
    metrics: Arc<Metrics>,
    orchestrator: CompressionOrchestrator,
    text_compressor: Option<Arc<dyn TextCompressor>>,
}

impl Sidecar {
    pub fn builder(config: HeadroomConfig) -> SidecarBuilder {
        SidecarBuilder {
            config,
            engine: None,
            text_compressor: None,
            store: None,
        }
    }

    pub fn config(&self) -> &HeadroomConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<CcrStore> {
        &self.store
    }

    pub fn pipeline_loaded(&self) -> bool {
        self.orchestrator.pipeline_loaded()
    }

    pub async fn compress(&self, request: CompressRequest) -> Result<CompressResponse, CompressError> {
        self.orchestrator.compress(request).await
    }

    /// Look up offloaded content; misses are reported in the response, not as errors
    pub fn retrieve(&self, request: &RetrieveRequest) -> RetrieveResponse {
        match self
            .store
            .search(&request.hash, request.query.as_deref(), request.max_results)
        {
            Ok(found) => RetrieveResponse {
                success: true,
                content: Some(found.content),
                items_retrieved: found.items_retrieved,
                was_search: found.was_search,
                error: None,
            },
            Err(e) => RetrieveResponse::failed(e.to_string()),
        }
    }

    /// Suggest stored payloads worth re-expanding for a query
    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, CompressError> {
        let expansions = self.store.find_by_keyword(&request.query)?;
        tracing::debug!(
            query = %request.query,
            turn = request.turn_number,
            hits = expansions.len(),
            "ccr analyze"
        );
        Ok(AnalyzeResponse { expansions })
    }

    pub fn track(&self, request: &TrackRequest) -> TrackResponse {
        tracing::info!(
            hash = %request.hash_key,
            turn = request.turn_number,
            tool = %request.tool_name,
            sample_chars = request.sample.chars().count(),
            "ccr compression tracked"
        );
        TrackResponse {
            tracked: true,
            hash_key: request.hash_key.clone(),
        }
    }

    pub fn health(&self) -> HealthReport {
        self.store.sweep(Utc::now());
        HealthReport {
            status: "healthy".to_string(),
            headroom_loaded: self.pipeline_loaded(),
            ccr_enabled: self.config.ccr.enabled,
            llmlingua_enabled: self.config.llmlingua.enabled,
            entries_cached: self.store.len(),
            config: self.config.to_json(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.store.len())
    }

    pub async fn compress_text(
        &self,
        request: &TextCompressRequest,
    ) -> Result<TextCompressResponse, CompressError> {
        if !self.config.llmlingua.enabled {
            return Err(ConfigError::NotEnabled(TEXT_COMPRESSOR_NAME).into());
        }
        let compressor = self
            .text_compressor
            .as_ref()
            .ok_or(ConfigError::NotInstalled(TEXT_COMPRESSOR_NAME))?;

        let force_tokens = request.force_tokens.as_deref().unwrap_or_default();
        let raw = compressor
            .compress_prompt(&request.text, request.target_ratio, force_tokens)
            .await?;
        Ok(raw.into_response(&request.text, request.target_ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextCompression;
    use async_trait::async_trait;
    use headroom_core::{Message, MessageContent};
    use serde_json::json;

    fn sidecar() -> Sidecar {
        let mut config = HeadroomConfig::new();
        config.smart_crusher.min_tokens = 10;
        Sidecar::builder(config).build()
    }

    struct HalvingCompressor;

    #[async_trait]
    impl TextCompressor for HalvingCompressor {
        async fn compress_prompt(
            &self,
            text: &str,
            _rate: f64,
            _force_tokens: &[String],
        ) -> Result<TextCompression, CompressError> {
            let half: String = text.chars().take(text.chars().count() / 2).collect();
            Ok(TextCompression {
                compressed_prompt: half,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_compress_then_retrieve() {
        let sidecar = sidecar();
        let big = "2024-01-01 INFO request handled\n".repeat(100);
        let request = CompressRequest::new(vec![Message::user(MessageContent::Blocks(vec![
            json!({"type": "tool_result", "tool_use_id": "toolu_7", "content": big}),
        ]))]);

        let response = sidecar.compress(request).await.unwrap();
        assert!(response.compressed);

        let reference = response.messages[0].blocks().unwrap()[0]["content"]
            .as_str()
            .unwrap()
            .to_string();
        let hash = reference[5..17].to_string();

        let got = sidecar.retrieve(&RetrieveRequest {
            hash,
            query: None,
            max_results: 20,
        });
        assert!(got.success);
        assert!(!got.was_search);
        assert_eq!(got.content, Some(json!(big)));
        assert_eq!(sidecar.metrics().ccr_retrievals, 1);
    }

    #[test]
    fn test_retrieve_unknown_hash() {
        let got = sidecar().retrieve(&RetrieveRequest {
            hash: "deadbeef0000".to_string(),
            query: None,
            max_results: 20,
        });
        assert!(!got.success);
        assert_eq!(got.error.as_deref(), Some("Hash deadbeef0000 not found or expired"));
    }

    #[test]
    fn test_retrieve_query_miss_on_string() {
        let sidecar = sidecar();
        let hash = sidecar.store().put(json!("all good here"), "t").unwrap().address;
        let got = sidecar.retrieve(&RetrieveRequest {
            hash,
            query: Some("panic".to_string()),
            max_results: 20,
        });
        assert!(!got.success);
        assert_eq!(got.error.as_deref(), Some("Query not found in content"));
    }

    #[test]
    fn test_retrieve_request_defaults() {
        let req: RetrieveRequest = serde_json::from_value(json!({"hash": "abc"})).unwrap();
        assert_eq!(req.max_results, 20);
        assert!(req.query.is_none());
    }

    #[test]
    fn test_analyze_wire_format() {
        let sidecar = sidecar();
        sidecar
            .store()
            .put(json!("connection refused on port 5432"), "toolu_db")
            .unwrap();

        let resp = sidecar
            .analyze(&AnalyzeRequest {
                query: "Connection".to_string(),
                turn_number: 3,
            })
            .unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["expansions"][0]["tool_name"], "toolu_db");
        assert_eq!(json["expansions"][0]["relevance"], 0.8);
        assert_eq!(json["expansions"][0]["hash"].as_str().unwrap().len(), 12);
    }

    #[test]
    fn test_track_acknowledges() {
        let resp = sidecar().track(&TrackRequest {
            hash_key: "abc123abc123".to_string(),
            turn_number: 2,
            tool_name: "bash".to_string(),
            sample: "first lines".to_string(),
        });
        assert!(resp.tracked);
        assert_eq!(resp.hash_key, "abc123abc123");
    }

    #[test]
    fn test_health_report() {
        let sidecar = sidecar();
        sidecar.store().put(json!("x"), "t").unwrap();
        let report = sidecar.health();
        assert_eq!(report.status, "healthy");
        assert!(!report.headroom_loaded);
        assert!(report.ccr_enabled);
        assert_eq!(report.entries_cached, 1);
        assert_eq!(report.config["smart_crusher"]["min_tokens"], 10);
    }

    #[test]
    fn test_health_sweeps_expired_entries() {
        let store = Arc::new(CcrStore::new(60, Arc::new(Metrics::new())));
        store
            .put_at(json!("stale output"), "toolu_old", Utc::now() - chrono::Duration::seconds(120))
            .unwrap();
        store.put(json!("fresh output"), "toolu_new").unwrap();
        assert_eq!(store.len(), 2);

        let sidecar = Sidecar::builder(HeadroomConfig::new())
            .store(Arc::clone(&store))
            .build();
        let report = sidecar.health();

        assert_eq!(report.entries_cached, 1);
        assert_eq!(sidecar.store().len(), 1);
    }

    #[tokio::test]
    async fn test_ccr_disabled_never_offloads() {
        let mut config = HeadroomConfig::new();
        config.smart_crusher.min_tokens = 10;
        config.ccr.enabled = false;
        let sidecar = Sidecar::builder(config).build();

        let request = CompressRequest::new(vec![Message::user(MessageContent::Blocks(vec![
            json!({"type": "tool_result", "tool_use_id": "t", "content": "z".repeat(5000)}),
        ]))]);
        let response = sidecar.compress(request).await.unwrap();
        assert!(!response.compressed);
        assert!(sidecar.store().is_empty());
    }

    #[tokio::test]
    async fn test_compress_text_not_enabled() {
        let err = sidecar()
            .compress_text(&TextCompressRequest {
                text: "hello".to_string(),
                target_ratio: 0.5,
                force_tokens: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_enabled");
    }

    #[tokio::test]
    async fn test_compress_text_not_installed() {
        let mut config = HeadroomConfig::new();
        config.llmlingua.enabled = true;
        let err = Sidecar::builder(config)
            .build()
            .compress_text(&TextCompressRequest {
                text: "hello".to_string(),
                target_ratio: 0.5,
                force_tokens: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_installed");
        assert_eq!(err.to_string(), "LLMLingua not installed");
    }

    #[tokio::test]
    async fn test_compress_text_with_compressor() {
        let mut config = HeadroomConfig::new();
        config.llmlingua.enabled = true;
        let sidecar = Sidecar::builder(config)
            .text_compressor(Arc::new(HalvingCompressor))
            .build();

        let resp = sidecar
            .compress_text(&TextCompressRequest {
                text: "abcdefghijklmnop".to_string(),
                target_ratio: 0.5,
                force_tokens: Some(vec!["abc".to_string()]),
            })
            .await
            .unwrap();
        assert_eq!(resp.compressed, "abcdefgh");
        assert_eq!(resp.original_tokens, 4);
        assert_eq!(resp.compressed_tokens, 2);
        assert_eq!(resp.ratio, 0.5);
    }
}
