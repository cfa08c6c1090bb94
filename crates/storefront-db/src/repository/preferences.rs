//! # Preferences Repository
//!
//! Typed access to the `preferences` key-value table.
//!
//! ## Keys
//! ```text
//! ┌──────────────┬───────────────────────────┬──────────────────────────────┐
//! │ key          │ value                     │ absent means                 │
//! ├──────────────┼───────────────────────────┼──────────────────────────────┤
//! │ auth_token   │ raw token                 │ anonymous                    │
//! │ app_language │ "en" | "ru" | "uk" | "pl" │ system default               │
//! │ app_currency │ "UAH" | "USD" | "EUR"     │ UAH                          │
//! │ onboarding   │ OnboardingPreferences JSON│ questionnaire not answered   │
//! └──────────────┴───────────────────────────┴──────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use storefront_core::{AuthToken, CurrencyCode, LanguageTag, OnboardingPreferences};

pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_LANGUAGE: &str = "app_language";
pub const KEY_CURRENCY: &str = "app_currency";
pub const KEY_ONBOARDING: &str = "onboarding";

/// Repository for locally persisted preferences.
#[derive(Debug, Clone)]
pub struct PreferencesRepository {
    pool: SqlitePool,
}

impl PreferencesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PreferencesRepository { pool }
    }

    // =========================================================================
    // Raw key-value access
    // =========================================================================

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Inserts or replaces a value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key, "Preference saved");
        Ok(())
    }

    /// Deletes a value. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key, "Preference removed");
        Ok(())
    }

    // =========================================================================
    // Auth token
    // =========================================================================

    pub async fn auth_token(&self) -> DbResult<Option<AuthToken>> {
        Ok(self
            .get(KEY_AUTH_TOKEN)
            .await?
            .filter(|t| !t.is_empty())
            .map(AuthToken::new))
    }

    pub async fn save_auth_token(&self, token: &AuthToken) -> DbResult<()> {
        self.set(KEY_AUTH_TOKEN, token.expose()).await
    }

    pub async fn clear_auth_token(&self) -> DbResult<()> {
        self.remove(KEY_AUTH_TOKEN).await
    }

    // =========================================================================
    // Language
    // =========================================================================

    /// Stored UI language, `None` for system default.
    ///
    /// An unrecognised stored tag is treated as system default.
    pub async fn language(&self) -> DbResult<Option<LanguageTag>> {
        let Some(raw) = self.get(KEY_LANGUAGE).await? else {
            return Ok(None);
        };
        match LanguageTag::parse_optional(&raw) {
            Ok(tag) => Ok(tag),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring unknown stored language");
                Ok(None)
            }
        }
    }

    pub async fn set_language(&self, tag: Option<LanguageTag>) -> DbResult<()> {
        match tag {
            Some(tag) => self.set(KEY_LANGUAGE, tag.as_str()).await,
            None => self.remove(KEY_LANGUAGE).await,
        }
    }

    // =========================================================================
    // Currency
    // =========================================================================

    /// Stored display currency, UAH when unset or unrecognised.
    pub async fn currency(&self) -> DbResult<CurrencyCode> {
        let Some(raw) = self.get(KEY_CURRENCY).await? else {
            return Ok(CurrencyCode::default());
        };
        Ok(raw.parse().unwrap_or_else(|e| {
            warn!(value = %raw, error = %e, "Ignoring unknown stored currency");
            CurrencyCode::default()
        }))
    }

    pub async fn set_currency(&self, code: CurrencyCode) -> DbResult<()> {
        self.set(KEY_CURRENCY, code.code()).await
    }

    // =========================================================================
    // Onboarding
    // =========================================================================

    /// Stored answers. A row that no longer parses counts as no answers.
    pub async fn onboarding(&self) -> DbResult<Option<OnboardingPreferences>> {
        let Some(raw) = self.get(KEY_ONBOARDING).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => Ok(Some(prefs)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable onboarding answers");
                Ok(None)
            }
        }
    }

    pub async fn save_onboarding(&self, prefs: &OnboardingPreferences) -> DbResult<()> {
        let json =
            serde_json::to_string(prefs).map_err(|e| DbError::invalid_value(KEY_ONBOARDING, e))?;
        self.set(KEY_ONBOARDING, &json).await
    }

    pub async fn reset_onboarding(&self) -> DbResult<()> {
        self.remove(KEY_ONBOARDING).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
