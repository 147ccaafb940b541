//! Contract for external multi-transform compression engines

use crate::error::PipelineError;
use async_trait::async_trait;
use headroom_core::{HeadroomConfig, Message, Provider};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transform the engine is asked to run, with its settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum TransformSpec {
    SmartCrusher {
        min_tokens_to_crush: usize,
        max_items_after_crush: usize,
    },
    ToolCrusher,
    CacheAligner,
    RollingWindow {
        keep_last_turns: usize,
    },
}

/// Ordered transform list plus provider, built once from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePlan {
    pub provider: Provider,
    pub mode: String,
    pub transforms: Vec<TransformSpec>,
}

impl PipelinePlan {
    pub fn from_config(config: &HeadroomConfig) -> Self {
        let mut transforms = Vec::new();
        if config.smart_crusher.enabled {
            transforms.push(TransformSpec::SmartCrusher {
                min_tokens_to_crush: config.smart_crusher.min_tokens,
                max_items_after_crush: config.smart_crusher.max_items,
            });
        }
        if config.tool_crusher.enabled {
            transforms.push(TransformSpec::ToolCrusher);
        }
        if config.cache_aligner.enabled {
            transforms.push(TransformSpec::CacheAligner);
        }
        if config.rolling_window.enabled {
            transforms.push(TransformSpec::RollingWindow {
                keep_last_turns: config.rolling_window.keep_turns,
            });
        }

        Self {
            provider: config.provider,
            mode: config.mode.clone(),
            transforms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// Everything an engine receives for one call
#[derive(Debug, Clone, Serialize)]
pub struct EngineRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub model_limit: u64,
    #[serde(flatten)]
    pub plan: PipelinePlan,
}

/// An applied transform, reported either by name or as an object with a name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TransformRef {
    Name(String),
    Named { name: String },
}

impl TransformRef {
    pub fn into_name(self) -> String {
        match self {
            TransformRef::Name(name) | TransformRef::Named { name } => name,
        }
    }
}

/// The result shapes an engine may produce
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResult {
    /// Result object with `messages` and `transforms_applied`
    Structured {
        messages: Vec<Message>,
        transforms_applied: Vec<TransformRef>,
    },
    /// Mapping with optional `messages` and `transforms`
    Legacy {
        messages: Option<Vec<Message>>,
        transforms: Vec<TransformRef>,
    },
    /// Bare message list
    Raw(Vec<Message>),
}

/// Engine output reduced to the two things the orchestrator needs
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub messages: Vec<Message>,
    pub transforms_applied: Vec<String>,
}

impl EngineResult {
    /// Classify a JSON engine response
    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        #[derive(Deserialize)]
        struct StructuredBody {
            messages: Vec<Message>,
            transforms_applied: Vec<TransformRef>,
        }

        #[derive(Deserialize)]
        struct LegacyBody {
            #[serde(default)]
            messages: Option<Vec<Message>>,
            #[serde(default)]
            transforms: Vec<TransformRef>,
        }

        let shape_err = |e: serde_json::Error| PipelineError::UnrecognizedShape(e.to_string());

        if value.is_array() {
            return Ok(EngineResult::Raw(
                serde_json::from_value(value).map_err(shape_err)?,
            ));
        }
        if value.get("transforms_applied").is_some() {
            let body: StructuredBody = serde_json::from_value(value).map_err(shape_err)?;
            return Ok(EngineResult::Structured {
                messages: body.messages,
                transforms_applied: body.transforms_applied,
            });
        }
        if value.is_object() {
            let body: LegacyBody = serde_json::from_value(value).map_err(shape_err)?;
            return Ok(EngineResult::Legacy {
                messages: body.messages,
                transforms: body.transforms,
            });
        }
        Err(PipelineError::UnrecognizedShape(format!(
            "expected a list or object, got {}",
            json_kind(&value)
        )))
    }

    /// Reduce any shape to messages plus transform names; a mapping without
    /// messages keeps `original`
    pub fn normalize(self, original: &[Message]) -> NormalizedResult {
        let names = |refs: Vec<TransformRef>| -> Vec<String> {
            refs.into_iter().map(TransformRef::into_name).collect()
        };
        match self {
            EngineResult::Structured {
                messages,
                transforms_applied,
            } => NormalizedResult {
                messages,
                transforms_applied: names(transforms_applied),
            },
            EngineResult::Legacy {
                messages,
                transforms,
            } => NormalizedResult {
                messages: messages.unwrap_or_else(|| original.to_vec()),
                transforms_applied: names(transforms),
            },
            EngineResult::Raw(messages) => NormalizedResult {
                messages,
                transforms_applied: Vec::new(),
            },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An external compression engine
#[async_trait]
pub trait TransformEngine: Send + Sync {
    /// Engine name used in logs
    fn name(&self) -> &str;

    async fn apply(&self, request: EngineRequest) -> Result<EngineResult, PipelineError>;
}
