use async_trait::async_trait;
use url::Url;

use super::{
    ManagerError, SigninPopupArgs, SigninRedirectArgs, SigninResourceOwnerCredentialsArgs,
    SigninSilentArgs, SignoutPopupArgs, SignoutRedirectArgs, SignoutSilentArgs, User,
};

/// Result type for user manager operations.
pub type Result<T> = std::result::Result<T, ManagerError>;

/// Abstraction over the OIDC client library's user manager.
///
/// The protocol work (PKCE, token requests, popup and iframe handling,
/// storage) happens behind this trait; the controller only observes outcomes.
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Load the stored user, if any.
    async fn get_user(&self) -> Result<Option<User>>;

    async fn signin_popup(&self, args: Option<SigninPopupArgs>) -> Result<User>;

    /// Renew in a hidden frame or with a refresh token. `None` when the
    /// provider reports no session.
    async fn signin_silent(&self, args: Option<SigninSilentArgs>) -> Result<Option<User>>;

    /// Start a redirect signin. Usually navigates away and resolves to `None`;
    /// hosts that complete the redirect in-process return the user.
    async fn signin_redirect(&self, args: Option<SigninRedirectArgs>) -> Result<Option<User>>;

    async fn signin_resource_owner_credentials(
        &self,
        args: Option<SigninResourceOwnerCredentialsArgs>,
    ) -> Result<User>;

    async fn signout_popup(&self, args: Option<SignoutPopupArgs>) -> Result<()>;

    async fn signout_redirect(&self, args: Option<SignoutRedirectArgs>) -> Result<()>;

    async fn signout_silent(&self, args: Option<SignoutSilentArgs>) -> Result<()>;

    /// Process an authorization callback URL.
    async fn signin_callback(&self, url: &Url) -> Result<Option<User>>;

    /// Process an end-session callback URL.
    async fn signout_callback(&self, url: &Url) -> Result<()>;

    /// Remove the stored user without contacting the provider.
    async fn remove_user(&self) -> Result<()>;

    /// Revoke the stored access and refresh tokens.
    async fn revoke_tokens(&self) -> Result<()>;
}

/// Notifications the user manager raises outside of any navigator call.
#[derive(Debug, Clone, PartialEq)]
pub enum UserManagerEvent {
    UserLoaded(User),
    UserUnloaded,
    /// The provider session ended elsewhere (e.g. another tab signed out).
    UserSignedOut,
    SilentRenewError(ManagerError),
}
