//! Compression decision pipeline with a basic CCR fallback

mod compress;
pub mod compressor;
pub mod engine;
mod error;
pub mod gateway;
mod orchestrator;
mod service;
pub mod text;

pub use compress::{
    reference_text, FallbackCompressor, FallbackOutcome, FALLBACK_TRANSFORM,
    OFFLOAD_THRESHOLD_CHARS,
};
pub use compressor::HttpTransformEngine;
pub use engine::{
    EngineRequest, EngineResult, NormalizedResult, PipelinePlan, TransformEngine, TransformRef,
    TransformSpec,
};
pub use error::{CompressError, PipelineError};
pub use gateway::PipelineGateway;
pub use orchestrator::CompressionOrchestrator;
pub use service::{
    AnalyzeRequest, AnalyzeResponse, HealthReport, RetrieveRequest, RetrieveResponse, Sidecar,
    SidecarBuilder, TrackRequest, TrackResponse,
};
pub use text::{TextCompressRequest, TextCompressResponse, TextCompression, TextCompressor};
