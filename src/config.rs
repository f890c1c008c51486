//! Application-level configuration loading: default room, room limits and
//! score rules.

use std::{env, fs, io::ErrorKind, ops::RangeInclusive, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dto::validation::validate_room_code;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CARD_SCORING_CONFIG_PATH";
/// Room opened at startup so a single fixed room works without setup.
const DEFAULT_ROOM: &str = "000000";
const DEFAULT_MAX_ROOMS: usize = 256;
/// At most a tenth of the six-digit code space may be in use.
const MAX_ROOMS_LIMIT: usize = 100_000;
const DEFAULT_SCORE_MIN: i64 = 1;
const DEFAULT_SCORE_MAX: i64 = 99_999;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    default_room: String,
    max_rooms: usize,
    score_bounds: Option<RangeInclusive<i64>>,
    allow_score_deletion: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        default_room = %app_config.default_room,
                        max_rooms = app_config.max_rooms,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
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

    /// Parse a JSON document; omitted keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Code of the room opened at startup.
    pub fn default_room(&self) -> &str {
        &self.default_room
    }

    /// Upper bound on simultaneously open rooms.
    pub fn max_rooms(&self) -> usize {
        self.max_rooms
    }

    /// Accepted score values, or `None` when any value is accepted.
    pub fn score_bounds(&self) -> Option<&RangeInclusive<i64>> {
        self.score_bounds.as_ref()
    }

    /// Whether individual score entries may be deleted.
    pub fn allow_score_deletion(&self) -> bool {
        self.allow_score_deletion
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    default_room: String,
    max_rooms: usize,
    score_min: i64,
    score_max: i64,
    enforce_score_bounds: bool,
    allow_score_deletion: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            default_room: DEFAULT_ROOM.to_string(),
            max_rooms: DEFAULT_MAX_ROOMS,
            score_min: DEFAULT_SCORE_MIN,
            score_max: DEFAULT_SCORE_MAX,
            enforce_score_bounds: true,
            allow_score_deletion: true,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let score_bounds = if value.enforce_score_bounds {
            if value.score_min > value.score_max {
                warn!(
                    min = value.score_min,
                    max = value.score_max,
                    "score bounds inverted; swapping"
                );
                Some(value.score_max..=value.score_min)
            } else {
                Some(value.score_min..=value.score_max)
            }
        } else {
            None
        };

        let default_room = match validate_room_code(&value.default_room) {
            Ok(()) => value.default_room,
            Err(err) => {
                warn!(
                    room = %value.default_room,
                    error = %err,
                    fallback = DEFAULT_ROOM,
                    "invalid default room code; using fallback"
                );
                DEFAULT_ROOM.to_string()
            }
        };

        Self {
            default_room,
            max_rooms: value.max_rooms.clamp(1, MAX_ROOMS_LIMIT),
            score_bounds,
            allow_score_deletion: value.allow_score_deletion,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
