//! Auth state controller.
//!
//! Drives the user manager and keeps the `AuthState` that consumers observe in
//! step with it. The state lives in a `watch` channel: readers take snapshots
//! or subscribe, and every transition is published as one consistent value.

use std::sync::Arc;

use authstate_core::auth::{
    has_auth_params, initial_auth_state, reduce_all, ActiveNavigator, AuthAction, AuthState,
    ErrorContext, ErrorSource, ManagerError, NavigatorRequest, SigninPopupArgs,
    SigninRedirectArgs, SigninResourceOwnerCredentialsArgs, SigninSilentArgs, SignoutPopupArgs,
    SignoutRedirectArgs, SignoutSilentArgs, User, UserManager, UserManagerEvent,
};
use chrono::Utc;
use tokio::sync::watch;
use url::Url;

use crate::config::ControllerConfig;
use crate::error::ControllerError;

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Owns the auth state for one user manager.
///
/// At most one navigator runs at a time; a second call while one is in flight
/// is rejected with `NavigatorBusy` and leaves the state untouched.
#[derive(Clone)]
pub struct AuthController {
    manager: Arc<dyn UserManager>,
    config: ControllerConfig,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthController {
    pub fn new(manager: Arc<dyn UserManager>, config: ControllerConfig) -> Self {
        let (state, _) = watch::channel(initial_auth_state());
        Self {
            manager,
            config,
            state: Arc::new(state),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Load the initial user, processing callback URLs first.
    ///
    /// When `current_url` carries authorization callback parameters (and
    /// callback handling is not skipped) the callback is completed before
    /// falling back to the stored user. A URL matching the configured
    /// signout callback is completed as well.
    ///
    /// # Errors
    ///
    /// Returns the recorded `ErrorContext` (source `signinCallback` or
    /// `signoutCallback`) if either step fails.
    pub async fn initialize(&self, current_url: Option<&Url>) -> Result<()> {
        let mut outcome = Ok(());

        match self.load_initial_user(current_url).await {
            Ok(user) => {
                tracing::debug!(authenticated = user.is_some(), "auth state initialised");
                self.dispatch([AuthAction::Initialised { user }]);
            }
            Err(err) => outcome = Err(self.record_failure(ErrorSource::SigninCallback, &err)),
        }

        if let Some(url) = current_url.filter(|url| self.config.is_signout_callback(url)) {
            tracing::debug!(%url, "processing signout callback");
            if let Err(err) = self.manager.signout_callback(url).await {
                outcome = Err(self.record_failure(ErrorSource::SignoutCallback, &err));
            }
        }

        outcome
    }

    async fn load_initial_user(
        &self,
        current_url: Option<&Url>,
    ) -> std::result::Result<Option<User>, ManagerError> {
        let mut user = None;

        if let Some(url) = current_url {
            if !self.config.skip_signin_callback
                && has_auth_params(url, self.config.response_mode)
            {
                tracing::debug!("processing signin callback");
                user = self.manager.signin_callback(url).await?;
            }
        }

        match user {
            Some(user) => Ok(Some(user)),
            None => self.manager.get_user().await,
        }
    }

    pub async fn signin_popup(&self, args: Option<SigninPopupArgs>) -> Result<Option<User>> {
        self.navigate(NavigatorRequest::SigninPopup(args)).await
    }

    pub async fn signin_silent(&self, args: Option<SigninSilentArgs>) -> Result<Option<User>> {
        self.navigate(NavigatorRequest::SigninSilent(args)).await
    }

    pub async fn signin_redirect(&self, args: Option<SigninRedirectArgs>) -> Result<Option<User>> {
        self.navigate(NavigatorRequest::SigninRedirect(args)).await
    }

    pub async fn signin_resource_owner_credentials(
        &self,
        args: Option<SigninResourceOwnerCredentialsArgs>,
    ) -> Result<Option<User>> {
        self.navigate(NavigatorRequest::SigninResourceOwnerCredentials(args))
            .await
    }

    pub async fn signout_popup(&self, args: Option<SignoutPopupArgs>) -> Result<()> {
        self.navigate(NavigatorRequest::SignoutPopup(args))
            .await
            .map(|_| ())
    }

    pub async fn signout_redirect(&self, args: Option<SignoutRedirectArgs>) -> Result<()> {
        self.navigate(NavigatorRequest::SignoutRedirect(args))
            .await
            .map(|_| ())
    }

    pub async fn signout_silent(&self, args: Option<SignoutSilentArgs>) -> Result<()> {
        self.navigate(NavigatorRequest::SignoutSilent(args))
            .await
            .map(|_| ())
    }

    /// Run one navigator operation.
    ///
    /// Resolves to the signed-in user for signin operations that produced
    /// one, `None` otherwise.
    ///
    /// # Errors
    ///
    /// - `NavigatorBusy` if another navigator is in flight.
    /// - `Operation` with the recorded context if the user manager fails.
    pub async fn navigate(&self, request: NavigatorRequest) -> Result<Option<User>> {
        let method = request.navigator();
        self.begin(method)?;
        let mut guard = NavigatorGuard {
            controller: self,
            method,
            settled: false,
        };

        let outcome = self.run(request.clone()).await;
        guard.settled = true;

        match outcome {
            Ok(user) => {
                tracing::info!(navigator = %method, "navigator completed");
                let loaded = match &user {
                    Some(user) => Some(AuthAction::UserLoaded { user: user.clone() }),
                    None if !method.is_signin() => Some(AuthAction::UserUnloaded),
                    None => None,
                };
                self.dispatch(loaded.into_iter().chain([AuthAction::NavigatorClose]));
                Ok(user)
            }
            Err(err) => {
                let context = ErrorContext::from_failure(request.into_error_source(), &err);
                tracing::warn!(navigator = %method, error = %err, "navigator failed");
                self.dispatch([
                    AuthAction::Error {
                        error: context.clone(),
                    },
                    AuthAction::NavigatorClose,
                ]);
                Err(ControllerError::Operation(context))
            }
        }
    }

    /// Delete the stored user locally.
    ///
    /// # Errors
    ///
    /// Returns the recorded context (source `unknown`) on failure.
    pub async fn remove_user(&self) -> Result<()> {
        match self.manager.remove_user().await {
            Ok(()) => {
                self.dispatch([AuthAction::UserUnloaded]);
                Ok(())
            }
            Err(err) => Err(self.record_failure(ErrorSource::Unknown, &err)),
        }
    }

    /// Revoke the stored tokens at the provider.
    ///
    /// # Errors
    ///
    /// Returns the recorded context (source `unknown`) on failure.
    pub async fn revoke_tokens(&self) -> Result<()> {
        self.manager
            .revoke_tokens()
            .await
            .map_err(|err| self.record_failure(ErrorSource::Unknown, &err))
    }

    /// Feed a user manager notification into the state.
    pub fn handle_event(&self, event: UserManagerEvent) {
        match event {
            UserManagerEvent::UserLoaded(user) => {
                tracing::debug!("user loaded");
                self.dispatch([AuthAction::UserLoaded { user }]);
            }
            UserManagerEvent::UserUnloaded => {
                tracing::debug!("user unloaded");
                self.dispatch([AuthAction::UserUnloaded]);
            }
            UserManagerEvent::UserSignedOut => {
                tracing::info!("user signed out at provider");
                self.dispatch([AuthAction::UserSignedOut]);
            }
            UserManagerEvent::SilentRenewError(err) => {
                self.record_failure(ErrorSource::RenewSilent, &err);
            }
        }
    }

    /// Drop the recorded error, if any.
    pub fn clear_error(&self) {
        self.dispatch([AuthAction::ClearError]);
    }

    /// Claim the navigator slot, atomically with the busy check.
    fn begin(&self, method: ActiveNavigator) -> Result<()> {
        let policy = self.config.error_policy;
        let now = Utc::now();
        let mut busy = None;

        self.state.send_if_modified(|state| {
            if let Some(active) = state.active_navigator() {
                busy = Some(active);
                return false;
            }
            *state = reduce_all(
                std::mem::take(state),
                [AuthAction::NavigatorInit { method }],
                policy,
                now,
            );
            true
        });

        match busy {
            Some(active) => {
                tracing::warn!(navigator = %method, %active, "navigator rejected while busy");
                Err(ControllerError::NavigatorBusy {
                    active,
                    requested: method,
                })
            }
            None => {
                tracing::debug!(navigator = %method, "navigator started");
                Ok(())
            }
        }
    }

    async fn run(&self, request: NavigatorRequest) -> std::result::Result<Option<User>, ManagerError> {
        match request {
            NavigatorRequest::SigninPopup(args) => self.manager.signin_popup(args).await.map(Some),
            NavigatorRequest::SigninSilent(args) => self.manager.signin_silent(args).await,
            NavigatorRequest::SigninRedirect(args) => self.manager.signin_redirect(args).await,
            NavigatorRequest::SigninResourceOwnerCredentials(args) => self
                .manager
                .signin_resource_owner_credentials(args)
                .await
                .map(Some),
            NavigatorRequest::SignoutPopup(args) => {
                self.manager.signout_popup(args).await.map(|()| None)
            }
            NavigatorRequest::SignoutRedirect(args) => {
                self.manager.signout_redirect(args).await.map(|()| None)
            }
            NavigatorRequest::SignoutSilent(args) => {
                self.manager.signout_silent(args).await.map(|()| None)
            }
        }
    }

    fn record_failure(&self, origin: ErrorSource, err: &ManagerError) -> ControllerError {
        let context = ErrorContext::from_failure(origin, err);
        tracing::warn!(source = context.source_tag(), error = %err, "auth operation failed");
        self.dispatch([AuthAction::Error {
            error: context.clone(),
        }]);
        ControllerError::Operation(context)
    }

    fn dispatch(&self, actions: impl IntoIterator<Item = AuthAction>) {
        let policy = self.config.error_policy;
        let now = Utc::now();
        self.state.send_modify(|state| {
            *state = reduce_all(std::mem::take(state), actions, policy, now);
        });
    }
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Releases the navigator slot if a `navigate` future is dropped mid-flight.
struct NavigatorGuard<'a> {
    controller: &'a AuthController,
    method: ActiveNavigator,
    settled: bool,
}

impl Drop for NavigatorGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(navigator = %self.method, "navigator abandoned before settling");
            self.controller.dispatch([AuthAction::NavigatorClose]);
        }
    }
}
