use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::DEFAULT_PENALTY_PER_WRONG_ATTEMPT;

pub const DEFAULT_CONFIG_FILE: &str = "scoreboard.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Empty disables the file log.
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
    /// Mirror log lines to stderr. Stdout is reserved for command output.
    #[serde(default)]
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file_name: default_log_file_name(),
            console: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardConfig {
    #[serde(default = "default_penalty_per_wrong_attempt")]
    pub penalty_per_wrong_attempt: u64,
    /// Where to write the final standings as JSON once input ends.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    #[serde(default)]
    pub log: LogConfig,
    /// File the config was read from; `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            penalty_per_wrong_attempt: default_penalty_per_wrong_attempt(),
            snapshot_path: None,
            log: LogConfig::default(),
            source: None,
        }
    }
}

fn default_penalty_per_wrong_attempt() -> u64 {
    DEFAULT_PENALTY_PER_WRONG_ATTEMPT
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_file_name() -> String {
    "scoreboard.log".to_string()
}

/// Loads `path`, or `scoreboard.toml` in the working directory when no path is
/// given. A missing default file yields the defaults; a missing explicit file is an error.
pub fn load_scoreboard_config(path: Option<&Path>) -> Result<ScoreboardConfig> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default_path.exists() {
                return Ok(ScoreboardConfig::default());
            }
            default_path
        }
    };

    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config at {}", config_path.display()))?;

    let mut config = parse_scoreboard_config(&raw)
        .with_context(|| format!("Failed to parse config at {}", config_path.display()))?;
    config.source = Some(config_path);
    Ok(config)
}

pub fn parse_scoreboard_config(raw: &str) -> Result<ScoreboardConfig> {
    Ok(toml::from_str::<ScoreboardConfig>(raw)?)
}
