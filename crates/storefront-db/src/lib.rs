//! # storefront-db: Local Preference Store
//!
//! SQLite-backed storage for the few things the client remembers between
//! runs: the session token, the chosen language and currency, and the
//! onboarding answers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionGate / LanguageSettings / CurrencySettings / Onboarding        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────────┐  ┌───────────┐  │   │
//! │  │   │   Database    │    │ PreferencesRepository│  │ Migrations│  │   │
//! │  │   │   (pool.rs)   │◄───│ token, language,    │  │ (embedded)│  │   │
//! │  │   │  SqlitePool   │    │ currency, onboarding │  │           │  │   │
//! │  │   └───────────────┘    └─────────────────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ~/.local/share/storefront/storefront.db                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! db.preferences().save_auth_token("token").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::preferences::PreferencesRepository;
