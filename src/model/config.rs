use serde::{Deserialize, Serialize};

use super::entry::UnfinishedPolicy;

fn default_translations_dir() -> String {
    "translations".to_string()
}

fn default_catalog_name() -> String {
    "dde-dock".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    #[serde(default = "default_translations_dir", alias = "translations")]
    pub translations_dir: String,

    /// File stem shared by every catalog, `<name>_<locale>.ts`.
    #[serde(default = "default_catalog_name")]
    pub catalog_name: String,

    /// Loaded at startup when non-empty.
    #[serde(default, alias = "locale")]
    pub default_locale: String,

    #[serde(default)]
    pub unfinished_policy: UnfinishedPolicy,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            translations_dir: default_translations_dir(),
            catalog_name: default_catalog_name(),
            default_locale: String::new(),
            unfinished_policy: UnfinishedPolicy::default(),
            log_level: default_log_level(),
        }
    }
}
