//! # Client Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Server              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Api { status }         │ │
//! │  │  InvalidUrl     │  │                 │  │  Deserialization        │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Session      │  │     Local       │  │      Internal           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ NotAuthenticated│  │  Core (rules)   │  │  ChannelClosed          │ │
//! │  │                 │  │  Store (SQLite) │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Screens never branch on these: every variant ends up as one generic
//! `LoadState::Error`. The categories exist for logs and for the few
//! callers that react (session expiry forces logout).

use thiserror::Error;

use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport / Server Errors
    // =========================================================================
    /// Request never produced a response (DNS, connect, reset).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-2xx status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// An authenticated call was attempted without a session token.
    #[error("Not logged in")]
    NotAuthenticated,

    // =========================================================================
    // Local Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Preference store error: {0}")]
    Store(#[from] DbError),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Deserialization(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Deserialization(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// True when a later manual retry could succeed. Nothing retries
    /// automatically; this only drives log levels and the retry hint.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// True when the server rejected the session token.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ClientError::NotAuthenticated => true,
            ClientError::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Http("connection reset".into()).is_retryable());
        assert!(ClientError::Api {
            status: 503,
            message: "down".into()
        }
        .is_retryable());

        assert!(!ClientError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ClientError::NotAuthenticated.is_retryable());
        assert!(!ClientError::InvalidConfig("x".into()).is_retryable());
    }

    #[test]
    fn test_auth_failures() {
        assert!(ClientError::NotAuthenticated.is_auth_failure());
        assert!(ClientError::Api {
            status: 401,
            message: "expired".into()
        }
        .is_auth_failure());
        assert!(!ClientError::Http("x".into()).is_auth_failure());
    }

    #[test]
    fn test_validation_wraps_into_core() {
        let err: ClientError = ValidationError::Required {
            field: "email".into(),
        }
        .into();
        assert!(matches!(err, ClientError::Core(CoreError::Validation(_))));
        assert_eq!(err.to_string(), "Validation error: email is required");
    }
}
