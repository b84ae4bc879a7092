//! Settings service
//!
//! Manages client settings persistence using JSON file storage.

use crate::config;
use crate::error::{AppError, Result};
use crate::filter::QuickFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Where the API lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    config::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    config::REQUEST_TIMEOUT_SECS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Day view preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplaySettings {
    /// Quick filter applied when a day is opened
    #[serde(default)]
    pub default_quick_filter: QuickFilter,
    /// Weekday (0 = Monday) opened first when a week loads
    #[serde(default)]
    pub default_weekday: u8,
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientSettings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl ClientSettings {
    /// Base URL to use, honouring the environment override.
    pub fn effective_base_url(&self) -> String {
        match std::env::var(config::BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.api.base_url.clone(),
        }
    }
}

/// Service for managing client settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(config::SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<ClientSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = ClientSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let mut settings: ClientSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?;
        clamp_loaded(&mut settings);

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &ClientSettings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_api(&self) -> Result<ApiSettings> {
        let settings = self.load().await?;
        Ok(settings.api)
    }

    /// Update API settings after validating them
    pub async fn update_api(&self, api: ApiSettings) -> Result<()> {
        validate_api(&api)?;
        let mut settings = self.load().await?;
        settings.api = api;
        self.save(&settings).await?;
        Ok(())
    }

    pub async fn get_display(&self) -> Result<DisplaySettings> {
        let settings = self.load().await?;
        Ok(settings.display)
    }

    pub async fn update_display(&self, display: DisplaySettings) -> Result<()> {
        if display.default_weekday > config::LAST_WEEKDAY {
            return Err(AppError::Config(format!(
                "Default weekday must be 0-{}",
                config::LAST_WEEKDAY
            )));
        }
        let mut settings = self.load().await?;
        settings.display = display;
        self.save(&settings).await?;
        Ok(())
    }
}

/// Hand-edited files may hold values `update_*` would reject.
fn clamp_loaded(settings: &mut ClientSettings) {
    let timeout = settings.api.timeout_secs.clamp(
        config::MIN_REQUEST_TIMEOUT_SECS,
        config::MAX_REQUEST_TIMEOUT_SECS,
    );
    if timeout != settings.api.timeout_secs {
        tracing::warn!(
            "Request timeout of {}s is out of range, using {}s",
            settings.api.timeout_secs,
            timeout
        );
        settings.api.timeout_secs = timeout;
    }

    if settings.display.default_weekday > config::LAST_WEEKDAY {
        tracing::warn!(
            "Default weekday {} is out of range, using Monday",
            settings.display.default_weekday
        );
        settings.display.default_weekday = 0;
    }
}

fn validate_api(api: &ApiSettings) -> Result<()> {
    let url = api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "Base URL must start with http:// or https://, got '{}'",
            api.base_url
        )));
    }

    if !(config::MIN_REQUEST_TIMEOUT_SECS..=config::MAX_REQUEST_TIMEOUT_SECS)
        .contains(&api.timeout_secs)
    {
        return Err(AppError::Config(format!(
            "Request timeout must be between {} and {} seconds",
            config::MIN_REQUEST_TIMEOUT_SECS,
            config::MAX_REQUEST_TIMEOUT_SECS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:8000");
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.display.default_quick_filter, QuickFilter::All);
        assert!(temp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_api_settings_persist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(path.clone());
            service
                .update_api(ApiSettings {
                    base_url: "https://schema.kalgarden.se".to_string(),
                    timeout_secs: 10,
                })
                .await
                .unwrap();
        }

        {
            let service = SettingsService::new(path);
            let api = service.get_api().await.unwrap();
            assert_eq!(api.base_url, "https://schema.kalgarden.se");
            assert_eq!(api.timeout(), Duration::from_secs(10));
        }
    }

    #[tokio::test]
    async fn test_invalid_api_settings_rejected() {
        let (service, _temp) = create_test_service();

        let bad_url = ApiSettings {
            base_url: "schema.kalgarden.se".to_string(),
            ..ApiSettings::default()
        };
        let bad_timeout = ApiSettings {
            timeout_secs: 0,
            ..ApiSettings::default()
        };

        assert!(service.update_api(bad_url).await.is_err());
        assert!(service.update_api(bad_timeout).await.is_err());
        assert_eq!(service.get_api().await.unwrap(), ApiSettings::default());
    }

    #[tokio::test]
    async fn test_display_preserved_after_api_update() {
        let (service, _temp) = create_test_service();

        service
            .update_display(DisplaySettings {
                default_quick_filter: QuickFilter::MissingStaff,
                default_weekday: 2,
            })
            .await
            .unwrap();
        service.update_api(ApiSettings::default()).await.unwrap();

        let display = service.get_display().await.unwrap();
        assert_eq!(display.default_quick_filter, QuickFilter::MissingStaff);
        assert_eq!(display.default_weekday, 2);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{ "api": { "base_url": "http://10.0.0.5:8000" } }"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.api.base_url, "http://10.0.0.5:8000");
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.display, DisplaySettings::default());
    }

    #[tokio::test]
    async fn test_out_of_range_values_are_clamped_on_load() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{ "api": { "timeout_secs": 0 }, "display": { "default_weekday": 6 } }"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.api.timeout_secs, config::MIN_REQUEST_TIMEOUT_SECS);
        assert_eq!(settings.api.timeout(), Duration::from_secs(1));
        assert_eq!(settings.display.default_weekday, 0);

        std::fs::write(
            temp.path().join("settings.json"),
            r#"{ "api": { "timeout_secs": 86400 } }"#,
        )
        .unwrap();
        let settings = service.load().await.unwrap();
        assert_eq!(settings.api.timeout_secs, config::MAX_REQUEST_TIMEOUT_SECS);
    }
}
