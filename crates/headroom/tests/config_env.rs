use headroom_core::{HeadroomConfig, Provider};
use serial_test::serial;

const VARS: [&str; 5] = [
    "HEADROOM_CCR_TTL",
    "HEADROOM_SMART_CRUSHER_MIN_TOKENS",
    "HEADROOM_PROVIDER",
    "HEADROOM_LLMLINGUA",
    "HEADROOM_PIPELINE_URL",
];

fn clear() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear();
    std::env::set_var("HEADROOM_CCR_TTL", "60");
    std::env::set_var("HEADROOM_SMART_CRUSHER_MIN_TOKENS", "500");
    std::env::set_var("HEADROOM_PROVIDER", "openai");
    std::env::set_var("HEADROOM_LLMLINGUA", "Yes");
    std::env::set_var("HEADROOM_PIPELINE_URL", "http://127.0.0.1:9100/apply");

    let config = HeadroomConfig::from_env();
    clear();

    assert_eq!(config.ccr.ttl_secs, 60);
    assert_eq!(config.min_tokens(), 500);
    assert_eq!(config.provider, Provider::OpenAi);
    assert!(config.llmlingua.enabled);
    assert_eq!(config.pipeline.url.as_deref(), Some("http://127.0.0.1:9100/apply"));
}

#[test]
#[serial]
fn test_from_env_bad_number_keeps_default() {
    clear();
    std::env::set_var("HEADROOM_CCR_TTL", "five minutes");
    let config = HeadroomConfig::from_env();
    clear();
    assert_eq!(config.ccr.ttl_secs, 300);
}
