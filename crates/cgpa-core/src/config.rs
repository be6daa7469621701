//! cgpa configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level cgpa configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CgpaConfig {
    /// Where the subject catalog JSON lives.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Default output format: text, json or markdown.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("subjects.json")
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for CgpaConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            format: default_format(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `cgpa.toml` in the current directory
/// 2. `~/.config/cgpa/config.toml`
///
/// `CGPA_CATALOG` overrides the catalog path.
pub fn load_config_from(path: Option<&Path>) -> Result<CgpaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("cgpa.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<CgpaConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => CgpaConfig::default(),
    };

    if let Ok(catalog) = std::env::var("CGPA_CATALOG") {
        config.catalog_path = PathBuf::from(catalog);
    }
    config.catalog_path = PathBuf::from(resolve_env_vars(&config.catalog_path.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("cgpa"))
}
