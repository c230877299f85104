// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/analytics.toml";

pub const ENV_CONFIG_PATH: &str = "ANALYTICS_CONFIG_PATH";
pub const ENV_DATA_DIR: &str = "ANALYTICS_DATA_DIR";
pub const ENV_STATIC_DIR: &str = "ANALYTICS_STATIC_DIR";

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/raw")
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Service configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the CSV exports.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory served as the dashboard UI.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default)]
    pub files: FileNames,
}

/// CSV file names inside `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub customers: String,
    pub tickets: String,
    pub incidents: String,
    pub feedback: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            customers: "customers.csv".into(),
            tickets: "support_tickets.csv".into(),
            incidents: "security_incidents.csv".into(),
            feedback: "customer_feedback.csv".into(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
            files: FileNames::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Resolve configuration:
    /// 1) $ANALYTICS_CONFIG_PATH (must exist)
    /// 2) config/analytics.toml, if present
    /// 3) built-in defaults
    ///
    /// then apply $ANALYTICS_DATA_DIR / $ANALYTICS_STATIC_DIR overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };

        if let Some(dir) = non_empty_env(ENV_DATA_DIR) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty_env(ENV_STATIC_DIR) {
            cfg.static_dir = PathBuf::from(dir);
        }

        info!(
            data_dir = %cfg.data_dir.display(),
            static_dir = %cfg.static_dir.display(),
            "analytics config resolved"
        );
        Ok(cfg)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
