use headroom_core::HeadroomConfig;
use headroom_telemetry::Paths;

pub fn run() -> anyhow::Result<()> {
    let config = HeadroomConfig::from_env();
    let mut output = config.to_json();
    output["state_dir"] = serde_json::json!(Paths::new()?.state_dir);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
