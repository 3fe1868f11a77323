use super::schema::LegendConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./legend.yaml
    /// 2. ~/.legend/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<LegendConfig, ConfigError> {
        let local_config = PathBuf::from("./legend.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".legend").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(LegendConfig::default())
    }

    /// An explicit path wins; a missing explicit file is an error.
    pub async fn load(path: Option<&Path>) -> Result<LegendConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }

    pub async fn load_from(path: &Path) -> Result<LegendConfig, ConfigError> {
        debug!(path = %path.display(), "Loading config");
        let content = tokio::fs::read_to_string(path).await?;
        let config: LegendConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
