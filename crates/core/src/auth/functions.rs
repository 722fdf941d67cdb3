use chrono::{DateTime, Utc};

use super::{ActiveNavigator, AuthState, ErrorContext, ErrorPolicy, User};

/// State transitions a controller applies in response to library activity.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    /// Library finished initializing, with the stored user if there is one.
    Initialised { user: Option<User> },
    UserLoaded { user: User },
    UserUnloaded,
    UserSignedOut,
    NavigatorInit { method: ActiveNavigator },
    NavigatorClose,
    Error { error: ErrorContext },
    ClearError,
}

/// Applies one action to a state.
///
/// `now` decides whether a loaded user counts as authenticated. Loading is
/// only released while no navigator is active, so a consistent input always
/// yields a consistent output.
pub fn reduce(
    mut state: AuthState,
    action: AuthAction,
    policy: ErrorPolicy,
    now: DateTime<Utc>,
) -> AuthState {
    match action {
        AuthAction::Initialised { user } => {
            load_user(&mut state, user, now);
        }
        AuthAction::UserLoaded { user } => {
            load_user(&mut state, Some(user), now);
        }
        AuthAction::UserUnloaded | AuthAction::UserSignedOut => {
            state.user.clear();
            state.is_authenticated = false;
        }
        AuthAction::NavigatorInit { method } => {
            state.is_loading = true;
            state.active_navigator.set(method);
            if policy == ErrorPolicy::ClearOnBegin {
                state.error.clear();
            }
        }
        AuthAction::NavigatorClose => {
            state.is_loading = false;
            state.active_navigator.clear();
        }
        AuthAction::Error { error } => {
            state.is_loading = state.is_navigating();
            state.error.set(error);
        }
        AuthAction::ClearError => {
            state.error.clear();
        }
    }
    state
}

/// Applies several actions as one transition.
pub fn reduce_all(
    state: AuthState,
    actions: impl IntoIterator<Item = AuthAction>,
    policy: ErrorPolicy,
    now: DateTime<Utc>,
) -> AuthState {
    actions
        .into_iter()
        .fold(state, |state, action| reduce(state, action, policy, now))
}

fn load_user(state: &mut AuthState, user: Option<User>, now: DateTime<Utc>) {
    state.is_authenticated = user.as_ref().is_some_and(|user| !user.expired(now));
    state.user.replace(user);
    state.is_loading = state.is_navigating();
    state.error.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{initial_auth_state, ErrorSource, SigninPopupArgs, UserProfile};
    use crate::Slot;
    use chrono::Duration;

    fn user_expiring_in(now: DateTime<Utc>, seconds: i64) -> User {
        User {
            id_token: None,
            session_state: None,
            access_token: "access".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            scope: None,
            profile: UserProfile::new("user-1"),
            expires_at: Some((now + Duration::seconds(seconds)).timestamp()),
            state: None,
        }
    }

    fn popup_error() -> ErrorContext {
        ErrorContext::new(
            ErrorSource::SigninPopup {
                args: Some(SigninPopupArgs::default()),
            },
            "Popup closed by user",
        )
    }

    fn apply(state: AuthState, action: AuthAction) -> AuthState {
        reduce(state, action, ErrorPolicy::ClearOnBegin, Utc::now())
    }

    #[test]
    fn initialised_with_valid_user_authenticates() {
        let now = Utc::now();
        let state = reduce(
            initial_auth_state(),
            AuthAction::Initialised {
                user: Some(user_expiring_in(now, 3600)),
            },
            ErrorPolicy::ClearOnBegin,
            now,
        );

        assert!(!state.is_loading);
        assert!(state.is_authenticated);
        assert!(state.user().is_some());
        assert!(state.is_consistent());
    }

    #[test]
    fn initialised_without_user_clears_user_slot() {
        let state = apply(initial_auth_state(), AuthAction::Initialised { user: None });

        assert!(!state.is_loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.user, Slot::Cleared);
    }

    #[test]
    fn expired_user_is_loaded_but_not_authenticated() {
        let now = Utc::now();
        let state = reduce(
            initial_auth_state(),
            AuthAction::UserLoaded {
                user: user_expiring_in(now, -10),
            },
            ErrorPolicy::ClearOnBegin,
            now,
        );

        assert!(state.user().is_some());
        assert!(!state.is_authenticated);
    }

    #[test]
    fn navigator_init_sets_loading_and_tag() {
        let idle = apply(initial_auth_state(), AuthAction::Initialised { user: None });
        let state = apply(
            idle,
            AuthAction::NavigatorInit {
                method: ActiveNavigator::SigninPopup,
            },
        );

        assert!(state.is_loading);
        assert_eq!(state.active_navigator(), Some(ActiveNavigator::SigninPopup));
        assert!(state.is_consistent());
    }

    #[test]
    fn failed_popup_matches_documented_scenario() {
        let state = apply(
            initial_auth_state(),
            AuthAction::NavigatorInit {
                method: ActiveNavigator::SigninPopup,
            },
        );
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!({
                "isLoading": true,
                "isAuthenticated": false,
                "activeNavigator": "signinPopup",
            })
        );

        let state = reduce_all(
            state,
            [
                AuthAction::Error {
                    error: popup_error(),
                },
                AuthAction::NavigatorClose,
            ],
            ErrorPolicy::ClearOnBegin,
            Utc::now(),
        );

        assert!(!state.is_loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.active_navigator, Slot::Cleared);
        let error = state.error().unwrap();
        assert_eq!(error.source_tag(), "signinPopup");
        assert_eq!(error.message, "Popup closed by user");
        assert_eq!(
            error.origin.args_json().unwrap().unwrap(),
            serde_json::json!({})
        );
        assert!(!serde_json::to_value(&state)
            .unwrap()
            .as_object()
            .unwrap()
            .contains_key("activeNavigator"));
    }

    #[test]
    fn settled_navigator_and_cleared_error_are_omitted_on_the_wire() {
        let begin = AuthAction::NavigatorInit {
            method: ActiveNavigator::SigninPopup,
        };
        let state = reduce_all(
            initial_auth_state(),
            [
                begin.clone(),
                AuthAction::Error {
                    error: popup_error(),
                },
                AuthAction::NavigatorClose,
                begin,
                AuthAction::NavigatorClose,
            ],
            ErrorPolicy::ClearOnBegin,
            Utc::now(),
        );

        assert_eq!(state.active_navigator, Slot::Cleared);
        assert_eq!(state.error, Slot::Cleared);
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"isLoading":false,"isAuthenticated":false}"#
        );
    }

    #[test]
    fn error_during_navigation_keeps_loading() {
        let state = apply(
            initial_auth_state(),
            AuthAction::NavigatorInit {
                method: ActiveNavigator::SigninSilent,
            },
        );
        let state = apply(
            state,
            AuthAction::Error {
                error: ErrorContext::new(ErrorSource::RenewSilent, "login_required"),
            },
        );

        assert!(state.is_loading);
        assert!(state.is_consistent());
    }

    #[test]
    fn clear_on_begin_drops_previous_error() {
        let failed = apply(
            initial_auth_state(),
            AuthAction::Error {
                error: popup_error(),
            },
        );
        let state = apply(
            failed,
            AuthAction::NavigatorInit {
                method: ActiveNavigator::SigninPopup,
            },
        );
        assert_eq!(state.error, Slot::Cleared);
    }

    #[test]
    fn retain_keeps_previous_error_until_cleared() {
        let now = Utc::now();
        let failed = reduce(
            initial_auth_state(),
            AuthAction::Error {
                error: popup_error(),
            },
            ErrorPolicy::Retain,
            now,
        );
        let state = reduce(
            failed,
            AuthAction::NavigatorInit {
                method: ActiveNavigator::SigninPopup,
            },
            ErrorPolicy::Retain,
            now,
        );
        assert!(state.error().is_some());

        let state = reduce(state, AuthAction::ClearError, ErrorPolicy::Retain, now);
        assert_eq!(state.error, Slot::Cleared);
    }

    #[test]
    fn successful_redirect_clears_navigator_and_error() {
        let now = Utc::now();
        let state = reduce_all(
            initial_auth_state(),
            [
                AuthAction::Error {
                    error: popup_error(),
                },
                AuthAction::NavigatorInit {
                    method: ActiveNavigator::SigninRedirect,
                },
                AuthAction::UserLoaded {
                    user: user_expiring_in(now, 3600),
                },
                AuthAction::NavigatorClose,
            ],
            ErrorPolicy::Retain,
            now,
        );

        assert!(!state.is_loading);
        assert!(state.is_authenticated);
        assert!(state.user().is_some());
        assert_eq!(state.active_navigator, Slot::Cleared);
        assert_eq!(state.error, Slot::Cleared);
    }

    #[test]
    fn unload_and_signed_out_drop_authentication() {
        let now = Utc::now();
        for action in [AuthAction::UserUnloaded, AuthAction::UserSignedOut] {
            let loaded = reduce(
                initial_auth_state(),
                AuthAction::UserLoaded {
                    user: user_expiring_in(now, 3600),
                },
                ErrorPolicy::ClearOnBegin,
                now,
            );
            let state = reduce(loaded, action, ErrorPolicy::ClearOnBegin, now);

            assert!(!state.is_authenticated);
            assert_eq!(state.user, Slot::Cleared);
        }
    }

    #[test]
    fn every_action_sequence_stays_consistent() {
        let now = Utc::now();
        let actions = vec![
            AuthAction::Initialised {
                user: Some(user_expiring_in(now, 60)),
            },
            AuthAction::NavigatorInit {
                method: ActiveNavigator::SignoutPopup,
            },
            AuthAction::Error {
                error: popup_error(),
            },
            AuthAction::UserUnloaded,
            AuthAction::UserLoaded {
                user: user_expiring_in(now, -60),
            },
            AuthAction::NavigatorClose,
            AuthAction::UserSignedOut,
            AuthAction::ClearError,
        ];

        // Every prefix of every rotation of the list.
        for offset in 0..actions.len() {
            let mut state = initial_auth_state();
            for action in actions.iter().cycle().skip(offset).take(actions.len()) {
                state = reduce(state, action.clone(), ErrorPolicy::ClearOnBegin, now);
                assert!(state.is_consistent(), "{state:?}");
            }
        }
    }
}
