//! # Repository Module
//!
//! Database repository implementations.
//!
//! - [`PreferencesRepository`](preferences::PreferencesRepository) - token,
//!   language, currency and onboarding answers

pub mod preferences;
