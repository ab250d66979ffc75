use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::config::CoreConfig;

pub const CONFIG_ENV: &str = "LINGUIST_CONFIG";
pub const TRANSLATIONS_DIR_ENV: &str = "LINGUIST_TRANSLATIONS_DIR";
pub const LOCALE_ENV: &str = "LINGUIST_LOCALE";

const CONFIG_FILE: &str = "linguist.json";

fn config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Config file plus environment overrides.
pub fn load() -> Result<CoreConfig, ConfigError> {
    let mut config = load_file(&config_path())?;
    apply_overrides(&mut config, |key| env::var(key).ok());
    Ok(config)
}

/// A missing file means defaults; an unreadable or invalid one is an error.
pub fn load_file(path: &Path) -> Result<CoreConfig, ConfigError> {
    if !path.exists() {
        return Ok(CoreConfig::default());
    }

    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str::<CoreConfig>(&data).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_overrides(config: &mut CoreConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = var(TRANSLATIONS_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        config.translations_dir = dir;
    }
    if let Some(locale) = var(LOCALE_ENV).filter(|v| !v.trim().is_empty()) {
        config.default_locale = locale;
    }
}
