//! Board configuration loaded from `.taskboard/config.yaml`.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Config file name within the board directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Lane new tasks land in when none is given.
pub const DEFAULT_LANE: &str = "todo";

/// Default lane display order.
pub const DEFAULT_LANES: [&str; 3] = ["todo", "doing", "done"];

/// Default daemon flush interval in milliseconds.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 100;

/// Per-board settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardConfig {
    /// Lanes in display order; the first one receives new tasks by default
    pub lanes: Vec<String>,

    /// How often the daemon writes a dirty board to disk
    pub flush_interval_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES.iter().map(|s| s.to_string()).collect(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
        }
    }
}

impl BoardConfig {
    /// Load the config from a board directory. A missing file yields defaults.
    pub fn load(board_dir: &Path) -> Result<Self> {
        let path = board_dir.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config.yaml")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config.yaml")?;
        Ok(config)
    }

    /// Write the config into a board directory.
    pub fn save(&self, board_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(board_dir.join(CONFIG_FILE), yaml).context("Failed to write config.yaml")?;
        Ok(())
    }

    /// Lane that receives tasks added without an explicit lane.
    pub fn default_lane(&self) -> &str {
        self.lanes.first().map(String::as_str).unwrap_or(DEFAULT_LANE)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}
