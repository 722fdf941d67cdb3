//! Mock user manager for development and testing.
//!
//! Stands in for the OIDC client library. Each navigator can be scripted to
//! succeed, fail or never settle, and callback URLs carry the user they
//! resolve to as a base64 encoded `code` parameter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authstate_core::auth::{
    ActiveNavigator, ManagerError, Result, SigninPopupArgs, SigninRedirectArgs,
    SigninResourceOwnerCredentialsArgs, SigninSilentArgs, SignoutPopupArgs, SignoutRedirectArgs,
    SignoutSilentArgs, User, UserManager, UserProfile,
};
use base64::Engine;
use chrono::Utc;
use tokio::sync::RwLock;
use url::Url;

/// How a scripted navigator settles.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockOutcome {
    #[default]
    Succeed,
    Fail(ManagerError),
    /// Never settles; the caller has to give up on it.
    Pending,
}

#[derive(Debug, Default)]
struct MockState {
    user: Option<User>,
    outcomes: HashMap<ActiveNavigator, MockOutcome>,
    signout_callback_failure: Option<ManagerError>,
    calls: Vec<&'static str>,
}

/// Scriptable in-memory `UserManager`.
///
/// Clones share the same stored user and script.
#[derive(Debug, Clone)]
pub struct MockUserManager {
    state: Arc<RwLock<MockState>>,
    latency: Option<Duration>,
    subject: String,
}

impl Default for MockUserManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUserManager {
    /// A manager with no stored user where every navigator succeeds.
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            latency: None,
            subject: "mock-user".to_string(),
        }
    }

    pub fn with_user(user: User) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                user: Some(user),
                ..Default::default()
            })),
            ..Self::new()
        }
    }

    /// Delay every navigator by `latency` before it settles.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Subject of the users that signins produce.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub async fn set_outcome(&self, navigator: ActiveNavigator, outcome: MockOutcome) {
        self.state.write().await.outcomes.insert(navigator, outcome);
    }

    pub async fn fail_signout_callback(&self, error: ManagerError) {
        self.state.write().await.signout_callback_failure = Some(error);
    }

    /// Operations invoked so far, by their wire names.
    pub async fn calls(&self) -> Vec<&'static str> {
        self.state.read().await.calls.clone()
    }

    pub async fn stored_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Authorization code that `signin_callback` resolves to `user`.
    pub fn encode_callback_code(user: &User) -> String {
        let json = serde_json::to_vec(user).unwrap_or_default();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    fn decode_callback_code(code: &str) -> Result<User> {
        let invalid = |reason: String| ManagerError::Response {
            error: "invalid_grant".to_string(),
            error_description: Some(reason),
            error_uri: None,
            state: None,
        };

        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| invalid(e.to_string()))?;

        serde_json::from_slice(&decoded).map_err(|e| invalid(e.to_string()))
    }

    async fn record(&self, call: &'static str) {
        self.state.write().await.calls.push(call);
    }

    async fn settle(&self, navigator: ActiveNavigator) -> Result<()> {
        self.record(navigator.as_str()).await;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let outcome = self
            .state
            .read()
            .await
            .outcomes
            .get(&navigator)
            .cloned()
            .unwrap_or_default();

        match outcome {
            MockOutcome::Succeed => Ok(()),
            MockOutcome::Fail(error) => {
                tracing::debug!(navigator = %navigator, %error, "mock navigator failing");
                Err(error)
            }
            MockOutcome::Pending => std::future::pending().await,
        }
    }

    async fn sign_in(&self, subject: &str) -> User {
        let user = mock_user(subject);
        self.state.write().await.user = Some(user.clone());
        user
    }

    async fn sign_out(&self) {
        self.state.write().await.user = None;
    }
}

#[async_trait]
impl UserManager for MockUserManager {
    async fn get_user(&self) -> Result<Option<User>> {
        self.record("getUser").await;
        Ok(self.stored_user().await)
    }

    async fn signin_popup(&self, _args: Option<SigninPopupArgs>) -> Result<User> {
        self.settle(ActiveNavigator::SigninPopup).await?;
        Ok(self.sign_in(&self.subject).await)
    }

    async fn signin_silent(&self, _args: Option<SigninSilentArgs>) -> Result<Option<User>> {
        self.settle(ActiveNavigator::SigninSilent).await?;
        match self.stored_user().await {
            Some(current) => Ok(Some(self.sign_in(&current.profile.sub).await)),
            None => Ok(None),
        }
    }

    async fn signin_redirect(&self, _args: Option<SigninRedirectArgs>) -> Result<Option<User>> {
        self.settle(ActiveNavigator::SigninRedirect).await?;
        Ok(Some(self.sign_in(&self.subject).await))
    }

    async fn signin_resource_owner_credentials(
        &self,
        args: Option<SigninResourceOwnerCredentialsArgs>,
    ) -> Result<User> {
        self.settle(ActiveNavigator::SigninResourceOwnerCredentials)
            .await?;
        let subject = args
            .map(|args| args.username)
            .filter(|username| !username.is_empty())
            .unwrap_or_else(|| self.subject.clone());
        Ok(self.sign_in(&subject).await)
    }

    async fn signout_popup(&self, _args: Option<SignoutPopupArgs>) -> Result<()> {
        self.settle(ActiveNavigator::SignoutPopup).await?;
        self.sign_out().await;
        Ok(())
    }

    async fn signout_redirect(&self, _args: Option<SignoutRedirectArgs>) -> Result<()> {
        self.settle(ActiveNavigator::SignoutRedirect).await?;
        self.sign_out().await;
        Ok(())
    }

    async fn signout_silent(&self, _args: Option<SignoutSilentArgs>) -> Result<()> {
        self.settle(ActiveNavigator::SignoutSilent).await?;
        self.sign_out().await;
        Ok(())
    }

    async fn signin_callback(&self, url: &Url) -> Result<Option<User>> {
        self.record("signinCallback").await;

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        if let Some(error) = params.get("error") {
            return Err(ManagerError::response(
                error.clone(),
                params.get("error_description").cloned(),
            ));
        }

        let Some(code) = params.get("code") else {
            return Ok(None);
        };
        let user = Self::decode_callback_code(code)?;
        self.state.write().await.user = Some(user.clone());
        Ok(Some(user))
    }

    async fn signout_callback(&self, _url: &Url) -> Result<()> {
        self.record("signoutCallback").await;
        let mut state = self.state.write().await;
        match state.signout_callback_failure.take() {
            Some(error) => Err(error),
            None => {
                state.user = None;
                Ok(())
            }
        }
    }

    async fn remove_user(&self) -> Result<()> {
        self.record("removeUser").await;
        self.sign_out().await;
        Ok(())
    }

    async fn revoke_tokens(&self) -> Result<()> {
        self.record("revokeTokens").await;
        if self.stored_user().await.is_none() {
            return Err(ManagerError::other("No user to revoke tokens for"));
        }
        Ok(())
    }
}

/// A user for `subject` whose access token is valid for another hour.
pub fn mock_user(subject: &str) -> User {
    let mut profile = UserProfile::new(subject);
    profile.claims.insert(
        "email".to_string(),
        serde_json::Value::String(format!("{subject}@example.com")),
    );
    profile.claims.insert(
        "name".to_string(),
        serde_json::Value::String(format!("Mock {subject}")),
    );

    User {
        id_token: Some(format!("mock-id-token-{subject}")),
        session_state: None,
        access_token: format!("mock-access-token-{subject}"),
        refresh_token: Some(format!("mock-refresh-token-{subject}")),
        token_type: "Bearer".to_string(),
        scope: Some("openid profile email".to_string()),
        profile,
        expires_at: Some(Utc::now().timestamp() + 3600),
        state: None,
    }
}
