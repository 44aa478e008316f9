use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use tokio::fs;

use crate::shared::error::{AppError, AppResult};

/// Environment variable that overrides the stored exchange-rate API key.
pub const CURRENCY_KEY_ENV: &str = "UNIVERSAL_CALC_CURRENCY_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub api_keys: ApiKeys,
    pub currency: CurrencySettings,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ApiKeys {
    pub currency_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurrencySettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    pub default_currency_from: String,
    pub default_currency_to: String,
    pub decimals: usize,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            base_url: "https://v6.exchangerate-api.com/v6".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_currency_from: "USD".to_string(),
            default_currency_to: "EUR".to_string(),
            decimals: 2,
        }
    }
}

impl CurrencySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "universal-calc")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::Config("Failed to determine config directory".to_string()))
    }

    /// Load settings from the default location, writing defaults on first run.
    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> AppResult<Self> {
        let mut settings = if fs::try_exists(path).await? {
            let content = fs::read_to_string(path).await
                .map_err(|e| AppError::Config(format!("Failed to read settings file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?
        } else {
            let settings = Self::default();
            settings.save_to(path).await?;
            tracing::info!(path = %path.display(), "wrote default settings");
            settings
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await
            .map_err(|e| AppError::Config(format!("Failed to write settings file: {}", e)))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(CURRENCY_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_keys.currency_api_key = key.trim().to_string();
            }
        }
    }
}
