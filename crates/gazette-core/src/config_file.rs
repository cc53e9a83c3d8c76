use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub labels: Option<LabelsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsConfig {
    pub card_category: Option<String>,
    pub featured_category: Option<String>,
    pub detail_category: Option<String>,
    pub author: Option<String>,
}

/// Platform config directory path: `<config_dir>/gazette/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gazette").join("config.toml"))
}

/// Load config by cascading CWD `.gazette.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".gazette.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match read_config(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Io(_)) => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config");
            None
        }
    }
}

/// Load a config the operator named explicitly; every failure is an error.
pub fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_api = base.api.unwrap_or_default();
    let over_api = overlay.api.unwrap_or_default();
    let base_labels = base.labels.unwrap_or_default();
    let over_labels = overlay.labels.unwrap_or_default();
    ConfigFile {
        api: Some(ApiConfig {
            base_url: over_api.base_url.or(base_api.base_url),
            request_timeout_secs: over_api
                .request_timeout_secs
                .or(base_api.request_timeout_secs),
            user_agent: over_api.user_agent.or(base_api.user_agent),
        }),
        labels: Some(LabelsConfig {
            card_category: over_labels.card_category.or(base_labels.card_category),
            featured_category: over_labels
                .featured_category
                .or(base_labels.featured_category),
            detail_category: over_labels.detail_category.or(base_labels.detail_category),
            author: over_labels.author.or(base_labels.author),
        }),
    }
}
