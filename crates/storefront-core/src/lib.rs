//! # storefront-core: Pure Client Logic for the Storefront
//!
//! This crate holds everything the storefront client decides without
//! touching the network, the disk or a clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Client Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/storefront-shell                          │   │
//! │  │        catalog ──► search ──► cart ──► login ──► order          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        storefront-client (session, cart sync, search)           │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼────────────────────┐  │
//! │  │  ★ storefront-core (THIS) ★     │  │  storefront-db (SQLite)     │  │
//! │  │  Money • Cart • Search • Types  │  │  token, language, currency  │  │
//! │  └─────────────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (Product, Category, Profile, orders, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - In-memory cart used while nobody is logged in
//! - [`search`] - Search filters, sort options and query history
//! - [`settings`] - Currency, language and onboarding preferences
//! - [`status`] - Load states observed by the UI
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod search;
pub mod settings;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use search::{SearchFilters, SearchHistory, SortOption};
pub use settings::{CurrencyCode, LanguageTag, OnboardingPreferences, OnboardingStatus};
pub use status::{AuthStatus, LoadState};
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// Maximum quantity of a single product in the cart.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum number of distinct products in the cart.
pub const MAX_CART_LINES: usize = 100;

/// Number of queries kept in the search history.
pub const SEARCH_HISTORY_LIMIT: usize = 10;

/// Quiet period before a typed query is sent (milliseconds).
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Page size for the home screen sections and similar products.
pub const HOME_SECTION_LIMIT: u32 = 12;
