use serde::{Deserialize, Serialize};

use super::{ActiveNavigator, ErrorContext, User};
use crate::serde::Slot;

/// Snapshot of authentication status as observed by a UI layer.
///
/// Invariants, checked by [`AuthState::is_consistent`]:
/// - `is_authenticated` implies `user` is present;
/// - an active navigator implies `is_loading`.
///
/// Loading without a navigator is valid: it is the initialization phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub user: Slot<User>,

    /// True while the library initializes or a navigator is in flight.
    pub is_loading: bool,

    /// True while the user holds an unexpired access token.
    pub is_authenticated: bool,

    /// The signin/signout request currently in flight. Never `null` on the wire.
    #[serde(default, skip_serializing_if = "Slot::is_unset")]
    pub active_navigator: Slot<ActiveNavigator>,

    /// The most recent signin, signout or renew failure. Never `null` on the wire.
    #[serde(default, skip_serializing_if = "Slot::is_unset")]
    pub error: Slot<ErrorContext>,
}

/// The state before the library has reported anything.
pub const fn initial_auth_state() -> AuthState {
    AuthState {
        user: Slot::Absent,
        is_loading: true,
        is_authenticated: false,
        active_navigator: Slot::Absent,
        error: Slot::Absent,
    }
}

impl Default for AuthState {
    fn default() -> Self {
        initial_auth_state()
    }
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.user.get()
    }

    pub fn active_navigator(&self) -> Option<ActiveNavigator> {
        self.active_navigator.get().copied()
    }

    pub fn error(&self) -> Option<&ErrorContext> {
        self.error.get()
    }

    pub fn is_navigating(&self) -> bool {
        self.active_navigator.is_present()
    }

    pub fn is_consistent(&self) -> bool {
        let authenticated_has_user = !self.is_authenticated || self.user.is_present();
        let navigating_is_loading = !self.is_navigating() || self.is_loading;
        authenticated_has_user && navigating_is_loading
    }
}
