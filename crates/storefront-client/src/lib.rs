//! # storefront-client: Runtime Services for the Storefront
//!
//! Everything with state or I/O: the REST client, the session gate, the
//! cart synchronizer, the debounced search pipeline, catalog screens and
//! the settings stores.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppContainer                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  SessionGate   │─►│CartSynchronizer│  │    SearchPipeline      │    │
//! │  │                │  │                │  │                        │    │
//! │  │ token watch    │  │ local or remote│  │ 300ms debounce         │    │
//! │  │ profile watch  │  │ lines + total  │  │ cancel in-flight       │    │
//! │  │ forced logout  │  │ serialized     │  │ history (10, no dupes) │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌──────────────────────────────────────────────┐  │
//! │  │ CatalogService │  │ Language / Currency / Onboarding settings    │  │
//! │  │ home, lists,   │  │ SQLite-backed, published via watch channels  │  │
//! │  │ similar        │  │                                              │  │
//! │  └────────────────┘  └──────────────────────────────────────────────┘  │
//! │                                                                         │
//! │           all remote calls ──► StorefrontApi ◄── HttpApi (reqwest)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `StorefrontApi` trait, the seam for the backend
//! - [`http`] - reqwest implementation of the trait
//! - [`config`] - Client configuration (TOML + environment)
//! - [`error`] - Client error types
//! - [`session`] - Login state and profile
//! - [`cart`] - Cart synchronizer
//! - [`search`] - Debounced search pipeline
//! - [`catalog`] - Categories, product lists, home feed
//! - [`settings`] - Language, currency and onboarding stores
//! - [`container`] - Builds and wires everything
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_client::{AppContainer, ClientConfig};
//! use storefront_db::{Database, DbConfig};
//!
//! let config = ClientConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new(config.database_path()?)).await?;
//! let app = AppContainer::build(config, db).await?;
//!
//! app.search.set_query("sneakers");
//! let mut results = app.search.subscribe();
//! results.changed().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod container;
pub mod error;
pub mod http;
pub mod search;
pub mod session;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::StorefrontApi;
pub use cart::CartSynchronizer;
pub use catalog::{CatalogService, HomeSections, ProductListView};
pub use config::ClientConfig;
pub use container::AppContainer;
pub use error::{ClientError, ClientResult};
pub use http::HttpApi;
pub use search::{SearchInputs, SearchPipeline, SearchResults};
pub use session::SessionGate;
pub use settings::{CurrencySettings, LanguageSettings, OnboardingSettings};
