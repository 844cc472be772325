use crate::error::AppError;
use crate::model::{COLOR_PALETTE, Priority, TaskDraft};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TRACKER_CONFIG_PATH";

const COLOR_NAMES: [(&str, &str); 5] = [
    ("red", "#FF6363"),
    ("orange", "#FFB563"),
    ("green", "#63FF8C"),
    ("blue", "#63B5FF"),
    ("purple", "#D463FF"),
];

/// Maps a palette name or hex code in any case to the palette hex.
/// Returns `None` for colors outside the palette.
pub fn canonical_color(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_ascii_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    if let Some((_, hex)) = COLOR_NAMES.iter().find(|(name, _)| *name == cleaned) {
        return Some(hex.to_string());
    }

    let hex = if cleaned.starts_with('#') {
        cleaned.to_ascii_uppercase()
    } else {
        format!("#{}", cleaned.to_ascii_uppercase())
    };
    COLOR_PALETTE
        .iter()
        .find(|candidate| **candidate == hex)
        .map(|candidate| candidate.to_string())
}

/// Defaults applied to tasks created from the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_color: Option<String>,
    #[serde(default)]
    pub default_category: Option<String>,
    #[serde(default)]
    pub default_priority: Option<Priority>,
    #[serde(default)]
    pub default_estimated_time: Option<u32>,
}

impl Config {
    pub fn draft<T: Into<String>>(&self, title: T) -> TaskDraft {
        let mut draft = TaskDraft::new(title);
        if let Some(color) = self.default_color.as_ref() {
            draft.color = color.clone();
        }
        if let Some(category) = self.default_category.as_ref() {
            draft.category = category.clone();
        }
        if let Some(priority) = self.default_priority {
            draft.priority = priority;
        }
        if let Some(estimated_time) = self.default_estimated_time {
            draft.estimated_time = Some(estimated_time);
        }
        draft
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub default_color: Option<String>,
    pub default_category: Option<String>,
    pub default_priority: Option<Priority>,
    pub default_estimated_time: Option<u32>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("tracker")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tracker")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!("ignoring config at {}: {}", path.display(), err);
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    normalize_config_color(config)
}

fn normalize_config_color(mut config: Config) -> Result<Config, AppError> {
    if let Some(color) = config.default_color.take() {
        let canonical = canonical_color(&color)
            .ok_or_else(|| AppError::invalid_data(format!("unknown color '{color}'")))?;
        config.default_color = Some(canonical);
    }
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(color) = overrides.default_color.as_ref()
        && let Some(canonical) = canonical_color(color)
    {
        merged.default_color = Some(canonical);
    }
    if let Some(category) = overrides.default_category.as_ref() {
        merged.default_category = Some(category.clone());
    }
    if let Some(priority) = overrides.default_priority {
        merged.default_priority = Some(priority);
    }
    if let Some(estimated_time) = overrides.default_estimated_time {
        merged.default_estimated_time = Some(estimated_time);
    }

    merged
}
