//! Application-level configuration loading, including the match rules.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::match_state::{MatchRules, labels_are_distinct};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_CONFIG_PATH";
/// Store key holding the scoreboard singleton.
pub const DEFAULT_STATE_KEY: &str = "scoreboard-state";

/// Reasons a configuration document is refused.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the expected shape.
    #[error("malformed config document")]
    Parse(#[from] serde_json::Error),
    /// A rule that must be positive was set to zero.
    #[error("`{field}` must be greater than zero")]
    Zero {
        /// Offending key.
        field: &'static str,
    },
    /// Default side names clash with each other or with the draw label.
    #[error("side names `{left}` and `{right}` cannot be told apart")]
    ConflictingNames {
        /// Configured left name.
        left: String,
        /// Configured right name.
        right: String,
    },
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    rules: MatchRules,
    state_key: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the built-in rules.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        match_duration_ms = app_config.rules.match_duration_ms,
                        win_score = app_config.rules.win_score,
                        win_margin = app_config.rules.win_margin,
                        "loaded match rules from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "invalid config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON configuration document. Missing keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config = Self::from(serde_json::from_str::<RawConfig>(contents)?);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.rules;
        if rules.match_duration_ms == 0 {
            return Err(ConfigError::Zero {
                field: "matchDurationMs",
            });
        }
        if rules.win_score == 0 {
            return Err(ConfigError::Zero { field: "winScore" });
        }
        if rules.win_margin == 0 {
            return Err(ConfigError::Zero { field: "winMargin" });
        }
        if !labels_are_distinct(&rules.left_name, &rules.right_name) {
            return Err(ConfigError::ConflictingNames {
                left: rules.left_name.clone(),
                right: rules.right_name.clone(),
            });
        }
        Ok(())
    }

    /// Rules the state machine enforces.
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Key under which the match state is persisted.
    pub fn state_key(&self) -> &str {
        &self.state_key
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: MatchRules::default(),
            state_key: DEFAULT_STATE_KEY.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    match_duration_ms: Option<u64>,
    win_score: Option<u32>,
    win_margin: Option<u32>,
    left_name: Option<String>,
    right_name: Option<String>,
    state_key: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = MatchRules::default();
        let rules = MatchRules {
            match_duration_ms: value
                .match_duration_ms
                .unwrap_or(defaults.match_duration_ms),
            win_score: value.win_score.unwrap_or(defaults.win_score),
            win_margin: value.win_margin.unwrap_or(defaults.win_margin),
            left_name: non_blank(value.left_name).unwrap_or(defaults.left_name),
            right_name: non_blank(value.right_name).unwrap_or(defaults.right_name),
        };

        Self {
            rules,
            state_key: non_blank(value.state_key).unwrap_or_else(|| DEFAULT_STATE_KEY.into()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
