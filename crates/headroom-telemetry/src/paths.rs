//! Path resolution for sidecar state files

use std::path::PathBuf;

/// Environment variable overriding the state directory
pub const STATE_DIR_ENV: &str = "HEADROOM_STATE_DIR";

/// Resolves standard paths for persisted sidecar state
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
}

impl Paths {
    /// Resolve from `HEADROOM_STATE_DIR`, falling back to `~/.headroom`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(STATE_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::with_root(dir));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::with_root(home.join(".headroom")))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: root.into(),
        }
    }

    /// Get the CCR store snapshot path
    pub fn ccr_snapshot_file(&self) -> PathBuf {
        self.state_dir.join("ccr_store.json")
    }
}
