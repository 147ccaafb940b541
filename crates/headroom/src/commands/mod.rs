pub mod analyze;
pub mod compress;
pub mod config;
pub mod health;
pub mod metrics;
pub mod retrieve;
pub mod serve;
pub mod version;

use headroom_ccr::CcrStore;
use headroom_compress::{PipelineGateway, Sidecar};
use headroom_core::HeadroomConfig;
use headroom_telemetry::{Metrics, Paths};
use std::io::{self, Read};
use std::sync::Arc;

/// A sidecar restored from the on-disk CCR snapshot
pub struct Session {
    pub sidecar: Sidecar,
    paths: Paths,
}

impl Session {
    pub fn open() -> anyhow::Result<Self> {
        Self::open_with(HeadroomConfig::from_env(), Paths::new()?)
    }

    pub fn open_with(config: HeadroomConfig, paths: Paths) -> anyhow::Result<Self> {
        let store = CcrStore::load(
            &paths.ccr_snapshot_file(),
            config.ccr.ttl_secs,
            Arc::new(Metrics::new()),
        )?;
        tracing::debug!(entries = store.len(), "ccr snapshot loaded");

        let mut builder = Sidecar::builder(config.clone()).store(Arc::new(store));
        if let Some(engine) = PipelineGateway::engine_from_config(&config) {
            builder = builder.engine(engine);
        }

        Ok(Self {
            sidecar: builder.build(),
            paths,
        })
    }

    /// Write live entries back to the snapshot
    pub fn persist(&self) -> anyhow::Result<()> {
        self.sidecar.store().save(&self.paths.ccr_snapshot_file())?;
        Ok(())
    }
}

/// Read a request body from `file`, or stdin when no file is given
pub fn read_input(file: Option<&str>) -> anyhow::Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
