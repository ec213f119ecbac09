//! Invocation configuration: transport identity and timeouts.
//!
//! Constructed once and passed by reference into `fetch`; nothing in the core
//! reads global state. Loaded from `~/.config/prepkit/config.toml` when the
//! CLI drives it, with a default file written on first run.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_user_agent() -> String {
    // Some release mirrors reject requests without a browser-looking UA.
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_4) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_transfer_timeout_secs() -> u64 {
    3600
}

fn default_low_speed_limit_bytes() -> u32 {
    1024
}

fn default_low_speed_time_secs() -> u64 {
    60
}

/// Global configuration for a prepkit invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepkitConfig {
    /// User-Agent header sent with every request (unless the caller overrides it).
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Hard cap on a single transfer in seconds.
    #[serde(default = "default_transfer_timeout_secs")]
    pub transfer_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec...
    #[serde(default = "default_low_speed_limit_bytes")]
    pub low_speed_limit_bytes: u32,
    /// ...sustained for this many seconds.
    #[serde(default = "default_low_speed_time_secs")]
    pub low_speed_time_secs: u64,
}

impl Default for PrepkitConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            transfer_timeout_secs: default_transfer_timeout_secs(),
            low_speed_limit_bytes: default_low_speed_limit_bytes(),
            low_speed_time_secs: default_low_speed_time_secs(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("prepkit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PrepkitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PrepkitConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PrepkitConfig = toml::from_str(&data)?;
    Ok(cfg)
}
