use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::model::{CommandId, DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Level of prefixes that declare none.
    pub default_level: u8,

    /// Entries kept per history key.
    pub history_limit: usize,

    /// Refuse to open a menu whose keys collide.
    pub detect_conflicts: bool,

    /// Delay before the menu is drawn; 0 draws immediately.
    pub show_delay_ms: u64,

    /// Write history back when a session ends.
    pub save_history: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Built-in command name -> key, e.g. `"quit-one": "C-g"`.
    pub builtin_keys: BTreeMap<String, String>,

    /// Extra predicate-table entries: command -> behavior name.
    pub behaviors: BTreeMap<CommandId, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL,
            history_limit: 10,
            detect_conflicts: true,
            show_delay_ms: 0,
            save_history: true,
            store_dir: None,
            builtin_keys: BTreeMap::new(),
            behaviors: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes =
            fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.default_level) {
            return Err(anyhow!(
                "default_level must be between {} and {}, got {}",
                MIN_LEVEL,
                MAX_LEVEL,
                self.default_level
            ));
        }
        Ok(())
    }

    pub fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
