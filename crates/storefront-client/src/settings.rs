//! # Settings Services
//!
//! Language, display currency and onboarding answers. Each service loads its
//! value from the preference store once, then keeps store and watch channel
//! in step on every write.
//!
//! ```text
//!   set_*() ──► PreferencesRepository ──► watch::Sender ──► subscribers
//!                (persist first)           (publish after)
//! ```
//!
//! A failed write leaves the published value unchanged.

use tokio::sync::watch;
use tracing::info;

use crate::error::ClientResult;
use storefront_core::{CurrencyCode, LanguageTag, Money, OnboardingPreferences, OnboardingStatus};
use storefront_db::PreferencesRepository;

// =============================================================================
// Language
// =============================================================================

/// Selected UI language. `None` follows the system locale.
pub struct LanguageSettings {
    store: PreferencesRepository,
    tx: watch::Sender<Option<LanguageTag>>,
}

impl LanguageSettings {
    pub async fn load(store: PreferencesRepository) -> ClientResult<Self> {
        let current = store.language().await?;
        let (tx, _) = watch::channel(current);
        Ok(LanguageSettings { store, tx })
    }

    pub fn current(&self) -> Option<LanguageTag> {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LanguageTag>> {
        self.tx.subscribe()
    }

    /// Persists and publishes the tag. Setting the current value again does
    /// not notify subscribers.
    pub async fn set(&self, tag: Option<LanguageTag>) -> ClientResult<()> {
        self.store.set_language(tag).await?;
        let changed = self.tx.send_if_modified(|current| {
            if *current == tag {
                false
            } else {
                *current = tag;
                true
            }
        });
        if changed {
            info!(language = ?tag.map(|t| t.as_str()), "Language changed");
        }
        Ok(())
    }

    /// Accepts the raw settings value; blank or "system" clears the choice.
    pub async fn set_from_str(&self, raw: &str) -> ClientResult<()> {
        let tag = LanguageTag::parse_optional(raw)?;
        self.set(tag).await
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Display currency for prices.
pub struct CurrencySettings {
    store: PreferencesRepository,
    tx: watch::Sender<CurrencyCode>,
}

impl CurrencySettings {
    pub async fn load(store: PreferencesRepository) -> ClientResult<Self> {
        let current = store.currency().await?;
        let (tx, _) = watch::channel(current);
        Ok(CurrencySettings { store, tx })
    }

    pub fn current(&self) -> CurrencyCode {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CurrencyCode> {
        self.tx.subscribe()
    }

    pub async fn set(&self, code: CurrencyCode) -> ClientResult<()> {
        self.store.set_currency(code).await?;
        self.tx.send_replace(code);
        info!(currency = code.code(), "Currency changed");
        Ok(())
    }

    /// Converts a base-currency amount and formats it without fraction.
    pub fn format_price(&self, amount: Money) -> String {
        self.current().format(amount)
    }
}

// =============================================================================
// Onboarding
// =============================================================================

/// First-run questionnaire answers.
pub struct OnboardingSettings {
    store: PreferencesRepository,
    tx: watch::Sender<OnboardingStatus>,
}

impl OnboardingSettings {
    pub async fn load(store: PreferencesRepository) -> ClientResult<Self> {
        let status = OnboardingStatus::from_stored(store.onboarding().await?);
        let (tx, _) = watch::channel(status);
        Ok(OnboardingSettings { store, tx })
    }

    pub fn completion(&self) -> OnboardingStatus {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingStatus> {
        self.tx.subscribe()
    }

    /// Stores the answers as completed.
    pub async fn save(&self, mut prefs: OnboardingPreferences) -> ClientResult<()> {
        storefront_core::validation::validate_price_range(
            Some(prefs.min_price),
            Some(prefs.max_price),
        )?;
        prefs.completed = true;
        self.store.save_onboarding(&prefs).await?;
        info!(
            categories = prefs.selected_categories.len(),
            brands = prefs.selected_brands.len(),
            "Onboarding completed"
        );
        self.tx.send_replace(OnboardingStatus::Completed(prefs));
        Ok(())
    }

    /// Completes onboarding with no selections and the default price range.
    pub async fn skip(&self) -> ClientResult<()> {
        let prefs = OnboardingPreferences::skipped();
        self.store.save_onboarding(&prefs).await?;
        info!("Onboarding skipped");
        self.tx.send_replace(OnboardingStatus::Completed(prefs));
        Ok(())
    }

    pub async fn reset(&self) -> ClientResult<()> {
        self.store.reset_onboarding().await?;
        self.tx.send_replace(OnboardingStatus::NotCompleted);
        Ok(())
    }
}
