//! Application state and initialization
//!
//! Builds the transport, the authenticated client and the query layer from
//! the persisted settings. Everything the CLI (or an embedding UI) needs is
//! reachable through `AppState`.

use crate::api::Api;
use crate::config;
use crate::error::{AppError, Result};
use crate::page::SchedulePage;
use crate::query::Queries;
use crate::services::credentials::{KeyringTokenStore, TokenStore};
use crate::services::settings::{ClientSettings, SettingsService};
use crate::transport::{ApiClient, LogRedirect, LoginRedirect, ReqwestTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: ClientSettings,
    pub settings_service: SettingsService,
    pub queries: Queries,
}

impl AppState {
    /// Production wiring: reqwest transport, OS keyring, log-only redirect.
    pub async fn initialize(app_data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        std::fs::create_dir_all(&app_data_dir)?;

        let settings_service = SettingsService::new(app_data_dir.clone());
        let settings = settings_service.load().await?;
        let base_url = settings.effective_base_url();
        tracing::info!("Using API at {}", base_url);

        let transport = Arc::new(ReqwestTransport::new(&base_url, settings.api.timeout())?);
        let state = Self::assemble(
            app_data_dir,
            settings,
            settings_service,
            transport,
            Arc::new(KeyringTokenStore::new()),
            Arc::new(LogRedirect),
        );

        tracing::info!("Application initialized successfully");
        Ok(state)
    }

    /// Wire the state around an arbitrary transport and token store.
    pub async fn with_transport(
        app_data_dir: PathBuf,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        let settings_service = SettingsService::new(app_data_dir.clone());
        let settings = settings_service.load().await?;
        Ok(Self::assemble(
            app_data_dir,
            settings,
            settings_service,
            transport,
            tokens,
            redirect,
        ))
    }

    fn assemble(
        app_data_dir: PathBuf,
        settings: ClientSettings,
        settings_service: SettingsService,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        let client = ApiClient::new(transport, tokens, redirect);
        Self {
            app_data_dir,
            settings,
            settings_service,
            queries: Queries::new(Api::new(client)),
        }
    }

    pub fn api(&self) -> &Api {
        self.queries.api()
    }

    /// A fresh day-editing page honouring the display settings.
    pub fn schedule_page(&self) -> SchedulePage {
        SchedulePage::with_display(self.queries.clone(), &self.settings.display)
    }
}

/// `$KALGARDEN_DATA_DIR`, else `.kalgarden-scheduler` in the home directory.
pub fn default_app_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(config::DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir.trim()));
        }
    }

    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(config::APP_DIR_NAME))
        .ok_or_else(|| AppError::Generic("Failed to get app data dir: no home directory".to_string()))
}
