// src/core/config_manager.rs
//! Configuration from config.yaml plus environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::core::FsOps;

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub gemini: GeminiConfig,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub export_path: PathBuf,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_seconds: 60,
            max_retries: 2,
            retry_base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub seed_data: bool,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let environment = Self::environment_name();
        info!("Loading configuration for environment: {}", environment);

        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        let env_config = Self::load_environment(&current_dir.join(CONFIG_FILE), &environment)?;

        Ok(Self {
            environment: env_config,
            gemini: Self::load_gemini()?,
            server: Self::load_server()?,
        })
    }

    fn environment_name() -> String {
        std::env::var("ENVIRONMENT")
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Read the matching section of `config_path`, or fall back to defaults
    /// rooted at the working directory (or `/app` in production).
    pub fn load_environment(config_path: &Path, environment: &str) -> Result<EnvironmentConfig> {
        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !config_path.exists() {
            info!(
                "{} not found, using default paths",
                config_path.display()
            );
            let root = if environment == "production" {
                PathBuf::from("/app")
            } else {
                base_dir
            };
            return Ok(EnvironmentConfig {
                database_path: root.join("data").join("interview_hub.db"),
                export_path: root.join("data").join("exports"),
                log_file: None,
            });
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config_file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let section = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(EnvironmentConfig {
            database_path: resolve_path(&base_dir, &section.database_path),
            export_path: resolve_path(&base_dir, &section.export_path),
            log_file: section.log_file.map(|p| resolve_path(&base_dir, &p)),
        })
    }

    fn load_gemini() -> Result<GeminiConfig> {
        let defaults = GeminiConfig::default();

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if api_key.is_none() {
            info!("GEMINI_API_KEY not set, analysis requests will use fallback content");
        }

        Ok(GeminiConfig {
            api_key,
            base_url: std::env::var("GEMINI_API_URL").unwrap_or(defaults.base_url),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            timeout_seconds: env_or("GEMINI_TIMEOUT_SECS", defaults.timeout_seconds)?,
            max_retries: env_or("GEMINI_MAX_RETRIES", defaults.max_retries)?,
            retry_base_delay_ms: env_or("GEMINI_RETRY_BASE_MS", defaults.retry_base_delay_ms)?,
        })
    }

    fn load_server() -> Result<ServerSettings> {
        Ok(ServerSettings {
            port: env_or("ROCKET_PORT", DEFAULT_PORT)?,
            seed_data: env_or("SEED_DATA", true)?,
        })
    }

    /// Ensure all required directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.environment.export_path).await?;

        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }

        if let Some(log_parent) = self
            .environment
            .log_file
            .as_ref()
            .and_then(|path| path.parent())
        {
            FsOps::ensure_dir_exists(log_parent).await?;
        }

        Ok(())
    }
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Parse an environment variable, using `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::load_environment(&dir.path().join("config.yaml"), "local")
            .unwrap();

        assert_eq!(
            config.database_path,
            dir.path().join("data").join("interview_hub.db")
        );
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_selects_environment_section() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            r#"
local:
  database_path: data/local.db
  export_path: data/exports
production:
  database_path: /var/lib/interview-hub/prod.db
  export_path: /var/lib/interview-hub/exports
  log_file: /var/log/interview-hub.log
"#,
        )
        .unwrap();

        let local = ConfigManager::load_environment(&config_path, "local").unwrap();
        assert_eq!(local.database_path, dir.path().join("data/local.db"));

        let production = ConfigManager::load_environment(&config_path, "production").unwrap();
        assert_eq!(
            production.database_path,
            PathBuf::from("/var/lib/interview-hub/prod.db")
        );
        assert_eq!(
            production.log_file,
            Some(PathBuf::from("/var/log/interview-hub.log"))
        );
    }

    #[test]
    fn test_gemini_defaults() {
        let config = GeminiConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_base_delay_ms, 1000);
        assert_eq!(config.model, "gemini-pro");
    }

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: u16 = env_or("INTERVIEW_HUB_TEST_UNSET_VARIABLE", 1234).unwrap();
        assert_eq!(value, 1234);
    }
}
