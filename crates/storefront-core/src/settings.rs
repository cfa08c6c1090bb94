//! # User Settings
//!
//! Value types for the preferences the client persists locally: display
//! currency, UI language and the onboarding questionnaire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::PersonalRecommendationsRequest;

// =============================================================================
// Currency
// =============================================================================

/// Currency used to display prices.
///
/// Prices arrive in UAH; other currencies are derived with fixed rates.
///
/// ## Conversion Table
/// ```text
/// ┌──────────┬──────────┬─────────┐
/// │  Code    │  Rate    │ Symbol  │
/// ├──────────┼──────────┼─────────┤
/// │  UAH     │  1.0     │  ₴      │
/// │  USD     │  0.026   │  $      │
/// │  EUR     │  0.024   │  €      │
/// └──────────┴──────────┴─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Uah,
    Usd,
    Eur,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 3] = [CurrencyCode::Uah, CurrencyCode::Usd, CurrencyCode::Eur];

    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Uah => "UAH",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Uah => "₴",
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "€",
        }
    }

    /// Units of this currency per one UAH.
    pub fn rate(&self) -> f64 {
        match self {
            CurrencyCode::Uah => 1.0,
            CurrencyCode::Usd => 0.026,
            CurrencyCode::Eur => 0.024,
        }
    }

    /// Converts a base-currency amount to this currency (major units).
    pub fn convert(&self, amount: Money) -> f64 {
        amount.to_major() * self.rate()
    }

    /// Formats an amount for display with no fractional digits.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::settings::CurrencyCode;
    ///
    /// assert_eq!(CurrencyCode::Uah.format(Money::from_cents(129950)), "₴1300");
    /// assert_eq!(CurrencyCode::Usd.format(Money::from_cents(100000)), "$26");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let converted = self.convert(amount).round() as i64;
        if converted < 0 {
            format!("-{}{}", self.symbol(), converted.abs())
        } else {
            format!("{}{}", self.symbol(), converted)
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UAH" => Ok(CurrencyCode::Uah),
            "USD" => Ok(CurrencyCode::Usd),
            "EUR" => Ok(CurrencyCode::Eur),
            _ => Err(ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: CurrencyCode::ALL.iter().map(|c| c.code().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Language
// =============================================================================

/// UI language. `None` in settings means "follow the system".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    En,
    Ru,
    Uk,
    Pl,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 4] = [
        LanguageTag::En,
        LanguageTag::Ru,
        LanguageTag::Uk,
        LanguageTag::Pl,
    ];

    /// BCP-47 tag sent in `Accept-Language`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::En => "en",
            LanguageTag::Ru => "ru",
            LanguageTag::Uk => "uk",
            LanguageTag::Pl => "pl",
        }
    }

    /// Parses an optional stored tag. Blank means system default.
    pub fn parse_optional(value: &str) -> Result<Option<Self>, ValidationError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("system") {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(LanguageTag::En),
            "ru" => Ok(LanguageTag::Ru),
            "uk" => Ok(LanguageTag::Uk),
            "pl" => Ok(LanguageTag::Pl),
            _ => Err(ValidationError::NotAllowed {
                field: "language".to_string(),
                allowed: LanguageTag::ALL.iter().map(|l| l.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Onboarding
// =============================================================================

pub const DEFAULT_ONBOARDING_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_ONBOARDING_MAX_PRICE: f64 = 500.0;

/// Category ids offered by the onboarding questionnaire.
pub const ONBOARDING_CATEGORIES: [&str; 4] = ["women", "men", "unisex", "kids"];

/// Brand ids offered by the onboarding questionnaire.
pub const ONBOARDING_BRANDS: [&str; 4] = ["acme", "nord", "aurora", "vertex"];

/// Answers from the first-run questionnaire, used for personal
/// recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingPreferences {
    #[serde(default)]
    pub selected_categories: BTreeSet<String>,

    #[serde(default)]
    pub selected_brands: BTreeSet<String>,

    #[serde(default = "default_min_price")]
    pub min_price: f64,

    #[serde(default = "default_max_price")]
    pub max_price: f64,

    #[serde(default)]
    pub completed: bool,
}

fn default_min_price() -> f64 {
    DEFAULT_ONBOARDING_MIN_PRICE
}

fn default_max_price() -> f64 {
    DEFAULT_ONBOARDING_MAX_PRICE
}

impl Default for OnboardingPreferences {
    fn default() -> Self {
        OnboardingPreferences {
            selected_categories: BTreeSet::new(),
            selected_brands: BTreeSet::new(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            completed: false,
        }
    }
}

impl OnboardingPreferences {
    /// Completed preferences with empty selections and the default range.
    pub fn skipped() -> Self {
        OnboardingPreferences {
            completed: true,
            ..Default::default()
        }
    }

    pub fn toggle_category(&mut self, id: &str) {
        toggle(&mut self.selected_categories, id);
    }

    pub fn toggle_brand(&mut self, id: &str) {
        toggle(&mut self.selected_brands, id);
    }

    pub fn recommendations_request(&self) -> PersonalRecommendationsRequest {
        PersonalRecommendationsRequest {
            categories: self.selected_categories.iter().cloned().collect(),
            brands: self.selected_brands.iter().cloned().collect(),
            price_range: Some([self.min_price, self.max_price]),
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, id: &str) {
    if !set.remove(id) {
        set.insert(id.to_string());
    }
}

/// Whether the questionnaire has been answered.
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingStatus {
    NotCompleted,
    Completed(OnboardingPreferences),
}

impl OnboardingStatus {
    /// Only completed preferences count.
    pub fn from_stored(stored: Option<OnboardingPreferences>) -> Self {
        match stored {
            Some(prefs) if prefs.completed => OnboardingStatus::Completed(prefs),
            _ => OnboardingStatus::NotCompleted,
        }
    }

    pub fn preferences(&self) -> Option<&OnboardingPreferences> {
        match self {
            OnboardingStatus::Completed(prefs) => Some(prefs),
            OnboardingStatus::NotCompleted => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_format_has_no_fraction() {
        let price = Money::from_cents(100000); // 1000 UAH
        assert_eq!(CurrencyCode::Uah.format(price), "₴1000");
        assert_eq!(CurrencyCode::Usd.format(price), "$26");
        assert_eq!(CurrencyCode::Eur.format(price), "€24");
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
        assert_eq!(CurrencyCode::default(), CurrencyCode::Uah);
        assert!("GBP".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(LanguageTag::parse_optional("").unwrap(), None);
        assert_eq!(LanguageTag::parse_optional(" uk ").unwrap(), Some(LanguageTag::Uk));
        assert!(LanguageTag::parse_optional("de").is_err());
    }

    #[test]
    fn test_onboarding_defaults_and_toggle() {
        let mut prefs = OnboardingPreferences::default();
        assert_eq!(prefs.min_price, 0.0);
        assert_eq!(prefs.max_price, 500.0);

        prefs.toggle_category("women");
        prefs.toggle_brand("nord");
        prefs.toggle_category("women");
        assert!(prefs.selected_categories.is_empty());
        assert!(prefs.selected_brands.contains("nord"));
    }

    #[test]
    fn test_only_completed_preferences_count() {
        assert_eq!(
            OnboardingStatus::from_stored(Some(OnboardingPreferences::default())),
            OnboardingStatus::NotCompleted
        );
        let status = OnboardingStatus::from_stored(Some(OnboardingPreferences::skipped()));
        assert!(status.preferences().is_some());
    }

    #[test]
    fn test_recommendations_request() {
        let mut prefs = OnboardingPreferences::skipped();
        prefs.toggle_category("men");
        let request = prefs.recommendations_request();
        assert_eq!(request.categories, vec!["men".to_string()]);
        assert_eq!(request.price_range, Some([0.0, 500.0]));
    }
}
