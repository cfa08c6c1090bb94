//! # Validation Module
//!
//! Input checks run before a request leaves the client.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("user@example.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use secrecy::ExposeSecret;

use crate::error::ValidationError;
use crate::types::{Credentials, ProfileUpdate};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be blank
/// - Must have a non-empty local part and domain around a single '@'
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        }),
    }
}

/// Validates that a password is present. Strength rules belong to the server.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates login or registration input.
pub fn validate_credentials(credentials: &Credentials) -> ValidationResult<()> {
    validate_email(&credentials.email)?;
    validate_password(credentials.password.expose_secret())
}

/// Validates a profile update. At least one field must be set.
pub fn validate_profile_update(update: &ProfileUpdate) -> ValidationResult<()> {
    if update.is_empty() {
        return Err(ValidationError::Required {
            field: "email or password".to_string(),
        });
    }
    if let Some(email) = &update.email {
        validate_email(email)?;
    }
    if let Some(password) = &update.password {
        validate_password(password.expose_secret())?;
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity added to the cart.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a price range filter. Either bound may be open.
pub fn validate_price_range(min: Option<f64>, max: Option<f64>) -> ValidationResult<()> {
    for (field, value) in [("min_price", min), ("max_price", max)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ValidationError::MustBePositive {
                    field: field.to_string(),
                });
            }
        }
    }

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(ValidationError::InvalidFormat {
                field: "price range".to_string(),
                reason: format!("min {} is greater than max {}", lo, hi),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
