use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    CoreError, ErrorSource, SigninPopupArgs, SigninRedirectArgs,
    SigninResourceOwnerCredentialsArgs, SigninSilentArgs, SignoutPopupArgs, SignoutRedirectArgs,
    SignoutSilentArgs,
};

/// The signin/signout operation currently in flight.
///
/// Tags are serialized with their exact camelCase spelling, which consumers
/// compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActiveNavigator {
    SigninRedirect,
    SigninResourceOwnerCredentials,
    SigninPopup,
    SigninSilent,
    SignoutRedirect,
    SignoutPopup,
    SignoutSilent,
}

impl ActiveNavigator {
    /// Every navigator, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::SigninRedirect,
        Self::SigninResourceOwnerCredentials,
        Self::SigninPopup,
        Self::SigninSilent,
        Self::SignoutRedirect,
        Self::SignoutPopup,
        Self::SignoutSilent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SigninRedirect => "signinRedirect",
            Self::SigninResourceOwnerCredentials => "signinResourceOwnerCredentials",
            Self::SigninPopup => "signinPopup",
            Self::SigninSilent => "signinSilent",
            Self::SignoutRedirect => "signoutRedirect",
            Self::SignoutPopup => "signoutPopup",
            Self::SignoutSilent => "signoutSilent",
        }
    }

    pub fn is_signin(&self) -> bool {
        matches!(
            self,
            Self::SigninRedirect
                | Self::SigninResourceOwnerCredentials
                | Self::SigninPopup
                | Self::SigninSilent
        )
    }
}

impl std::fmt::Display for ActiveNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActiveNavigator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|navigator| navigator.as_str() == s)
            .ok_or_else(|| CoreError::UnknownNavigator(s.to_string()))
    }
}

/// When a recorded error is cleared.
///
/// A successful user load always clears the error. `ClearOnBegin` also clears
/// it as soon as the next navigator operation starts; `Retain` keeps it until
/// the caller clears it explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    #[serde(rename = "clear")]
    ClearOnBegin,
    Retain,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Self::ClearOnBegin),
            "retain" => Ok(Self::Retain),
            other => Err(CoreError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Identity claims of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Subject identifier issued by the provider.
    pub sub: String,
    /// Any other claims, kept as issued.
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            claims: serde_json::Map::new(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.get("email")?.as_str()
    }

    pub fn name(&self) -> Option<&str> {
        self.claims.get("name")?.as_str()
    }
}

/// The identity record produced by the OIDC client library.
///
/// Field names follow the library's storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub profile: UserProfile,
    /// Access token expiry, in seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Custom state passed through the signin request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

impl User {
    /// Seconds until the access token expires, negative once it has.
    pub fn expires_in(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|at| at - now.timestamp())
    }

    /// A user without `expires_at` never expires.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_in(now), Some(remaining) if remaining <= 0)
    }

    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A navigator operation together with the arguments it was invoked with.
///
/// This is the single place that pairs an operation with its error source, so
/// a failure is always recorded under the operation that was running.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorRequest {
    SigninPopup(Option<SigninPopupArgs>),
    SigninSilent(Option<SigninSilentArgs>),
    SigninRedirect(Option<SigninRedirectArgs>),
    SigninResourceOwnerCredentials(Option<SigninResourceOwnerCredentialsArgs>),
    SignoutPopup(Option<SignoutPopupArgs>),
    SignoutRedirect(Option<SignoutRedirectArgs>),
    SignoutSilent(Option<SignoutSilentArgs>),
}

impl NavigatorRequest {
    pub fn navigator(&self) -> ActiveNavigator {
        match self {
            Self::SigninPopup(_) => ActiveNavigator::SigninPopup,
            Self::SigninSilent(_) => ActiveNavigator::SigninSilent,
            Self::SigninRedirect(_) => ActiveNavigator::SigninRedirect,
            Self::SigninResourceOwnerCredentials(_) => {
                ActiveNavigator::SigninResourceOwnerCredentials
            }
            Self::SignoutPopup(_) => ActiveNavigator::SignoutPopup,
            Self::SignoutRedirect(_) => ActiveNavigator::SignoutRedirect,
            Self::SignoutSilent(_) => ActiveNavigator::SignoutSilent,
        }
    }

    /// The error source a failure of this request is recorded under.
    pub fn into_error_source(self) -> ErrorSource {
        match self {
            Self::SigninPopup(args) => ErrorSource::SigninPopup { args },
            Self::SigninSilent(args) => ErrorSource::SigninSilent { args },
            Self::SigninRedirect(args) => ErrorSource::SigninRedirect { args },
            Self::SigninResourceOwnerCredentials(args) => {
                ErrorSource::SigninResourceOwnerCredentials { args }
            }
            Self::SignoutPopup(args) => ErrorSource::SignoutPopup { args },
            Self::SignoutRedirect(args) => ErrorSource::SignoutRedirect { args },
            Self::SignoutSilent(args) => ErrorSource::SignoutSilent { args },
        }
    }

    /// Builds a request from a navigator tag and JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgs` if `args` does not match the navigator's argument
    /// shape.
    pub fn from_json(
        navigator: ActiveNavigator,
        args: Option<serde_json::Value>,
    ) -> Result<Self, CoreError> {
        fn parse<T: serde::de::DeserializeOwned>(
            navigator: ActiveNavigator,
            args: Option<serde_json::Value>,
        ) -> Result<Option<T>, CoreError> {
            args.map(serde_json::from_value)
                .transpose()
                .map_err(|source| CoreError::InvalidArgs { navigator, source })
        }

        Ok(match navigator {
            ActiveNavigator::SigninPopup => Self::SigninPopup(parse(navigator, args)?),
            ActiveNavigator::SigninSilent => Self::SigninSilent(parse(navigator, args)?),
            ActiveNavigator::SigninRedirect => Self::SigninRedirect(parse(navigator, args)?),
            ActiveNavigator::SigninResourceOwnerCredentials => {
                Self::SigninResourceOwnerCredentials(parse(navigator, args)?)
            }
            ActiveNavigator::SignoutPopup => Self::SignoutPopup(parse(navigator, args)?),
            ActiveNavigator::SignoutRedirect => Self::SignoutRedirect(parse(navigator, args)?),
            ActiveNavigator::SignoutSilent => Self::SignoutSilent(parse(navigator, args)?),
        })
    }
}
