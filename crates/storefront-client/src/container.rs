//! # Application Container
//!
//! Builds every service once and wires the reactions between them.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LanguageSettings ──language rx──► HttpApi (Accept-Language)           │
//! │        │                                                                │
//! │        ├──► CartSynchronizer::refresh_for_language_change              │
//! │        └──► SearchPipeline::retry                                      │
//! │                                                                         │
//! │  SessionGate ──token rx──► SessionGate::refresh_profile                │
//! │              └──────────► CartSynchronizer::refresh_for_session_change │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listener tasks are aborted when the container is dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::api::StorefrontApi;
use crate::cart::CartSynchronizer;
use crate::catalog::{CatalogService, HomeSections};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::HttpApi;
use crate::search::SearchPipeline;
use crate::session::SessionGate;
use crate::settings::{CurrencySettings, LanguageSettings, OnboardingSettings};
use storefront_core::LoadState;
use storefront_db::Database;

pub struct AppContainer {
    pub config: ClientConfig,
    pub db: Database,
    pub api: Arc<dyn StorefrontApi>,
    pub session: Arc<SessionGate>,
    pub cart: Arc<CartSynchronizer>,
    pub search: SearchPipeline,
    pub catalog: CatalogService,
    pub language: LanguageSettings,
    pub currency: CurrencySettings,
    pub onboarding: OnboardingSettings,
    listeners: Vec<JoinHandle<()>>,
}

impl AppContainer {
    /// Builds the container against the real HTTP backend.
    pub async fn build(config: ClientConfig, db: Database) -> ClientResult<Self> {
        let language = LanguageSettings::load(db.preferences()).await?;
        let api: Arc<dyn StorefrontApi> =
            Arc::new(HttpApi::from_config(&config, language.subscribe())?);
        Self::assemble(config, db, api, language).await
    }

    /// Builds the container around a caller-supplied backend.
    pub async fn with_api(
        config: ClientConfig,
        db: Database,
        api: Arc<dyn StorefrontApi>,
    ) -> ClientResult<Self> {
        let language = LanguageSettings::load(db.preferences()).await?;
        Self::assemble(config, db, api, language).await
    }

    async fn assemble(
        config: ClientConfig,
        db: Database,
        api: Arc<dyn StorefrontApi>,
        language: LanguageSettings,
    ) -> ClientResult<Self> {
        let store = db.preferences();

        let currency = CurrencySettings::load(store.clone()).await?;
        let onboarding = OnboardingSettings::load(store.clone()).await?;

        let session = Arc::new(SessionGate::load(Arc::clone(&api), store).await?);
        let cart = Arc::new(CartSynchronizer::new(Arc::clone(&api), Arc::clone(&session)));
        let search = SearchPipeline::start(Arc::clone(&api), config.debounce());
        let catalog = CatalogService::new(Arc::clone(&api));

        let listeners = vec![
            session.spawn_profile_listener(),
            cart.spawn_session_listener(),
            cart.spawn_language_listener(language.subscribe()),
            search.spawn_language_listener(language.subscribe()),
        ];

        info!(
            base_url = %config.api.base_url,
            authenticated = session.is_authenticated(),
            "Storefront client ready"
        );

        Ok(AppContainer {
            config,
            db,
            api,
            session,
            cart,
            search,
            catalog,
            language,
            currency,
            onboarding,
            listeners,
        })
    }

    /// Loads the home feed using the stored onboarding answers.
    pub async fn home(&self) -> LoadState<HomeSections> {
        let onboarding = self.onboarding.completion();
        self.catalog.home_sections(onboarding.preferences()).await
    }
}

impl Drop for AppContainer {
    fn drop(&mut self) {
        for handle in &self.listeners {
            handle.abort();
        }
    }
}
