//! Application configuration.
//!
//! The configuration is loaded from a JSON file, either the default
//! `$XDG_CONFIG_HOME/multitray/config.json` or a path passed on the command
//! line (`--config <path>`).  The top-level schema uses `"pipe"` and
//! `"timing"` keys so the file can be extended with additional sections
//! later without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "pipe": { "path": "/run/user/1000/multitray.fifo" },
//!   "timing": { "tick_ms": 50, "blink_interval_ms": 500 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional — a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named-pipe settings.
    #[serde(default)]
    pub pipe: PipeConfig,

    /// Event-loop and blink timing settings.
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Named-pipe settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Where to create the FIFO.  `None` means `multitray.fifo` in the
    /// current directory.  A `--pipepath` on the command line wins over
    /// this setting.
    pub path: Option<PathBuf>,
}

/// Event-loop and blink timing settings.
///
/// All durations are in **milliseconds**.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long the main loop waits for a command before advancing blink
    /// timers (ms).
    pub tick_ms: u64,
    /// How long each blink phase lasts (ms).
    pub blink_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            blink_interval_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
