//! Sidecar configuration loaded from `HEADROOM_*` environment variables

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Model provider the external pipeline tokenizes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    /// `openai` selects OpenAI; anything else is Anthropic
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("openai") {
            Provider::OpenAi
        } else {
            Provider::Anthropic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }
}

/// Smart crusher settings; `min_tokens` doubles as the compression gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartCrusherConfig {
    pub enabled: bool,
    pub min_tokens: usize,
    pub max_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowConfig {
    pub enabled: bool,
    pub keep_turns: usize,
}

/// Content-addressable retrieval cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcrConfig {
    pub enabled: bool,
    /// Entry time-to-live in seconds
    #[serde(rename = "ttl")]
    pub ttl_secs: u64,
}

/// Prompt-level text compression settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmLinguaConfig {
    pub enabled: bool,
    pub device: String,
}

/// External transform engine endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub url: Option<String>,
    pub timeout_ms: u64,
}

/// Sidecar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadroomConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,

    /// Operating mode (reported, forwarded to the engine)
    pub mode: String,
    pub provider: Provider,

    pub smart_crusher: SmartCrusherConfig,
    pub tool_crusher: ToggleConfig,
    pub cache_aligner: ToggleConfig,
    pub rolling_window: RollingWindowConfig,
    pub ccr: CcrConfig,
    pub llmlingua: LlmLinguaConfig,
    pub pipeline: PipelineConfig,
}

impl HeadroomConfig {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            log_level: "info".to_string(),
            mode: "optimize".to_string(),
            provider: Provider::Anthropic,
            smart_crusher: SmartCrusherConfig {
                enabled: true,
                min_tokens: 200,
                max_items: 15,
            },
            tool_crusher: ToggleConfig { enabled: true },
            cache_aligner: ToggleConfig { enabled: true },
            rolling_window: RollingWindowConfig {
                enabled: true,
                keep_turns: 3,
            },
            ccr: CcrConfig {
                enabled: true,
                ttl_secs: 300,
            },
            llmlingua: LlmLinguaConfig {
                enabled: false,
                device: "auto".to_string(),
            },
            pipeline: PipelineConfig {
                url: None,
                timeout_ms: 30_000,
            },
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup; missing or unparsable values
    /// keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        let string = |key: &str, default: &mut String| {
            if let Some(v) = lookup(key) {
                *default = v;
            }
        };
        let flag = |key: &str, default: &mut bool| {
            if let Some(v) = lookup(key) {
                *default = str_to_bool(&v);
            }
        };
        let number = |key: &str, default: &mut usize| parse_into(&lookup, key, default);

        string("HEADROOM_HOST", &mut config.host);
        parse_into(&lookup, "HEADROOM_PORT", &mut config.port);
        string("HEADROOM_LOG_LEVEL", &mut config.log_level);
        string("HEADROOM_MODE", &mut config.mode);
        if let Some(p) = lookup("HEADROOM_PROVIDER") {
            config.provider = Provider::parse(&p);
        }

        flag("HEADROOM_SMART_CRUSHER", &mut config.smart_crusher.enabled);
        number(
            "HEADROOM_SMART_CRUSHER_MIN_TOKENS",
            &mut config.smart_crusher.min_tokens,
        );
        number(
            "HEADROOM_SMART_CRUSHER_MAX_ITEMS",
            &mut config.smart_crusher.max_items,
        );
        flag("HEADROOM_TOOL_CRUSHER", &mut config.tool_crusher.enabled);
        flag("HEADROOM_CACHE_ALIGNER", &mut config.cache_aligner.enabled);
        flag("HEADROOM_ROLLING_WINDOW", &mut config.rolling_window.enabled);
        number("HEADROOM_KEEP_TURNS", &mut config.rolling_window.keep_turns);

        flag("HEADROOM_CCR", &mut config.ccr.enabled);
        parse_into(&lookup, "HEADROOM_CCR_TTL", &mut config.ccr.ttl_secs);

        flag("HEADROOM_LLMLINGUA", &mut config.llmlingua.enabled);
        string("HEADROOM_LLMLINGUA_DEVICE", &mut config.llmlingua.device);

        config.pipeline.url = lookup("HEADROOM_PIPELINE_URL").filter(|u| !u.trim().is_empty());
        parse_into(
            &lookup,
            "HEADROOM_PIPELINE_TIMEOUT_MS",
            &mut config.pipeline.timeout_ms,
        );

        config
    }

    /// Minimum estimated tokens before any compression is attempted
    pub fn min_tokens(&self) -> usize {
        self.smart_crusher.min_tokens
    }

    /// Nested view reported by the health check
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for HeadroomConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// `true`, `1`, `yes`, `on` (any case) are true; everything else is false
pub fn str_to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_into<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(v) => *slot = v,
        Err(_) => tracing::warn!(key, value = %raw, "invalid number, keeping default"),
    }
}
