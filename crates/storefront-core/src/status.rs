//! # Load States
//!
//! What a screen observes while data is being fetched. Every failure kind
//! (transport, non-2xx, not found) collapses into `Error`; the message is for
//! logs and diagnostics, the UI shows one generic text.

use crate::types::AuthResponse;

/// Tri-state status for a remote resource.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Success(v) => LoadState::Success(f(v)),
            LoadState::Error(e) => LoadState::Error(e),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for LoadState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => LoadState::Success(v),
            Err(e) => LoadState::Error(e.to_string()),
        }
    }
}

/// Status of the login/register form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    /// `Some` after login, `None` after registration.
    Success(Option<AuthResponse>),
    Error(String),
}
