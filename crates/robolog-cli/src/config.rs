//! Recorder configuration – reads/writes `~/.robolog/config.toml`.

use robolog_types::ModelKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted recorder configuration stored in `~/.robolog/config.toml`.
///
/// Every field has a serde default so a partial file (or none at all) still
/// yields a runnable configuration; environment variables override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API base URL. `None` records locally only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Robot identifier embedded in episode file names and sent to the
    /// backend as `client_id`.
    #[serde(default = "default_robot_id")]
    pub robot_id: String,

    /// Directory receiving one JSON file per episode.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Directory holding the error journal.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Policy model family to run.
    #[serde(default)]
    pub model: ModelKind,

    /// Recording duration per episode, seconds.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Pacing delay between loop iterations, milliseconds.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,

    /// Action vector length produced by the policy.
    #[serde(default = "default_action_dim")]
    pub action_dim: usize,

    /// Camera frame width in pixels.
    #[serde(default = "default_image_width")]
    pub image_width: usize,

    /// Camera frame height in pixels.
    #[serde(default = "default_image_height")]
    pub image_height: usize,

    /// Joint-state vector length.
    #[serde(default = "default_state_dim")]
    pub state_dim: usize,
}

fn default_robot_id() -> String {
    "unknown_robot".to_string()
}
fn default_save_dir() -> PathBuf {
    PathBuf::from("/opt/robolog/data")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("/opt/robolog/logs")
}
fn default_duration_secs() -> u64 {
    10
}
fn default_pace_ms() -> u64 {
    100
}
fn default_action_dim() -> usize {
    14
}
fn default_image_width() -> usize {
    640
}
fn default_image_height() -> usize {
    480
}
fn default_state_dim() -> usize {
    6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            robot_id: default_robot_id(),
            save_dir: default_save_dir(),
            log_dir: default_log_dir(),
            model: ModelKind::default(),
            duration_secs: default_duration_secs(),
            pace_ms: default_pace_ms(),
            action_dim: default_action_dim(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            state_dim: default_state_dim(),
        }
    }
}

/// Return the path to `~/.robolog/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".robolog").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `BACKEND_API_URL` | `api_url` |
/// | `ROBOT_ID` | `robot_id` |
/// | `ROBOLOG_SAVE_DIR` | `save_dir` |
/// | `ROBOLOG_LOG_DIR` | `log_dir` |
/// | `ROBOLOG_MODEL` | `model` |
/// | `ROBOLOG_DURATION_SECS` | `duration_secs` |
/// | `ROBOLOG_PACE_MS` | `pace_ms` |
///
/// Unparseable numeric or model values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("BACKEND_API_URL") {
        cfg.api_url = Some(v);
    }
    if let Ok(v) = std::env::var("ROBOT_ID") {
        cfg.robot_id = v;
    }
    if let Ok(v) = std::env::var("ROBOLOG_SAVE_DIR") {
        cfg.save_dir = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("ROBOLOG_LOG_DIR") {
        cfg.log_dir = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("ROBOLOG_MODEL")
        && let Ok(model) = v.parse::<ModelKind>()
    {
        cfg.model = model;
    }
    if let Ok(v) = std::env::var("ROBOLOG_DURATION_SECS")
        && let Ok(secs) = v.parse::<u64>()
    {
        cfg.duration_secs = secs;
    }
    if let Ok(v) = std::env::var("ROBOLOG_PACE_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.pace_ms = ms;
    }
}

/// Save the config to disk, creating `~/.robolog/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
