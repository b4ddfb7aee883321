use std::sync::Arc;

use anyhow::{Context, Result};
use persona_core::CivilZone;
use persona_core::repository::{MemoryRepository, Repository, seed_default_personas};
use persona_core::sync::RemoteCalendar;
use persona_provider_google::GoogleCalendar;

use crate::config::ServerConfig;
use crate::kis::KisClient;
use crate::market::MarketService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    /// `None` when no external calendar is configured.
    pub remote: Option<Arc<dyn RemoteCalendar>>,
    pub market: MarketService,
    pub zone: CivilZone,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        AppState {
            repo,
            remote: None,
            market: MarketService::mock(),
            zone: CivilZone::kst(),
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteCalendar>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_market(mut self, market: MarketService) -> Self {
        self.market = market;
        self
    }

    /// Open storage and wire up whichever collaborators are configured.
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let zone = CivilZone::named(&config.timezone)?;

        let data_file = config.data_file();
        let repo = MemoryRepository::open(&data_file)
            .await
            .with_context(|| format!("Failed to open data file {}", data_file.display()))?;
        tracing::info!(path = %data_file.display(), "opened data file");

        if config.storage.seed_default_personas {
            seed_default_personas(&repo).await?;
        }

        let mut state = AppState::new(Arc::new(repo));
        state.zone = zone;

        match config.google.credentials() {
            Some(credentials) => {
                let calendar = GoogleCalendar::new(credentials, &config.google.calendar_id);
                tracing::info!(calendar_id = calendar.calendar_id(), "Google Calendar sync enabled");
                state = state.with_remote(Arc::new(calendar));
            }
            None => tracing::info!("Google Calendar sync disabled (no access token)"),
        }

        match config.kis.credentials() {
            Some((app_key, secret_key)) => {
                let kis = KisClient::new(&config.kis.base_url, app_key, secret_key);
                state = state.with_market(MarketService::with_feed(Arc::new(kis)));
            }
            None => tracing::info!("KIS API keys not set, stock quotes are mock data"),
        }

        Ok(state)
    }
}
