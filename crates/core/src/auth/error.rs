use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::serde::Slot;

use super::{
    ActiveNavigator, SigninPopupArgs, SigninRedirectArgs, SigninResourceOwnerCredentialsArgs,
    SigninSilentArgs, SignoutPopupArgs, SignoutRedirectArgs, SignoutSilentArgs,
};

/// Errors raised by the pure core (tag parsing, malformed wire values).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown navigator: {0}")]
    UnknownNavigator(String),

    #[error("unknown error source: {0}")]
    UnknownSource(String),

    #[error("unknown error policy: {0}")]
    UnknownPolicy(String),

    #[error("unknown response mode: {0}")]
    UnknownResponseMode(String),

    #[error("invalid {navigator} arguments: {source}")]
    InvalidArgs {
        navigator: ActiveNavigator,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed error context: {0}")]
    Malformed(String),

    #[error("error source {0} does not carry arguments")]
    UnexpectedArgs(&'static str),

    #[error("error source {0} requires an args field")]
    MissingArgs(&'static str),
}

/// Failures reported by the OIDC client library.
///
/// `name()` matches the error class names the library throws, so an
/// `ErrorContext` built from one reads the same as its browser counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ManagerError {
    /// Error response from the authorization server.
    #[error("{}", .error_description.as_deref().unwrap_or(.error.as_str()))]
    Response {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<serde_json::Value>,
    },

    /// A popup, iframe or token request did not answer in time.
    #[error("{message}")]
    Timeout { message: String },

    /// The user closed the popup before the flow completed.
    #[error("Popup closed by user")]
    PopupClosed,

    #[error("network error: {message}")]
    Network { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl ManagerError {
    pub fn response(error: impl Into<String>, description: Option<String>) -> Self {
        Self::Response {
            error: error.into(),
            error_description: description,
            error_uri: None,
            state: None,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Error class name as thrown by the library.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Response { .. } => "ErrorResponse",
            Self::Timeout { .. } => "ErrorTimeout",
            Self::PopupClosed | Self::Network { .. } | Self::Storage { .. } | Self::Other { .. } => {
                "Error"
            }
        }
    }
}

/// Which operation produced an `ErrorContext`.
///
/// The seven navigator sources carry the arguments of the failed call (which
/// may themselves be absent); the four others carry nothing because no caller
/// supplied arguments to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ErrorSource {
    SigninCallback,
    SignoutCallback,
    RenewSilent,
    SigninPopup {
        args: Option<SigninPopupArgs>,
    },
    SigninSilent {
        args: Option<SigninSilentArgs>,
    },
    SigninRedirect {
        args: Option<SigninRedirectArgs>,
    },
    SigninResourceOwnerCredentials {
        args: Option<SigninResourceOwnerCredentialsArgs>,
    },
    SignoutPopup {
        args: Option<SignoutPopupArgs>,
    },
    SignoutRedirect {
        args: Option<SignoutRedirectArgs>,
    },
    SignoutSilent {
        args: Option<SignoutSilentArgs>,
    },
    Unknown,
}

impl ErrorSource {
    /// Every source tag, in declaration order.
    pub const TAGS: [&'static str; 11] = [
        "signinCallback",
        "signoutCallback",
        "renewSilent",
        "signinPopup",
        "signinSilent",
        "signinRedirect",
        "signinResourceOwnerCredentials",
        "signoutPopup",
        "signoutRedirect",
        "signoutSilent",
        "unknown",
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::SigninCallback => "signinCallback",
            Self::SignoutCallback => "signoutCallback",
            Self::RenewSilent => "renewSilent",
            Self::Unknown => "unknown",
            other => other
                .navigator()
                .map(|navigator| navigator.as_str())
                .unwrap_or("unknown"),
        }
    }

    /// The navigator whose failure this source records, if any.
    pub fn navigator(&self) -> Option<ActiveNavigator> {
        match self {
            Self::SigninPopup { .. } => Some(ActiveNavigator::SigninPopup),
            Self::SigninSilent { .. } => Some(ActiveNavigator::SigninSilent),
            Self::SigninRedirect { .. } => Some(ActiveNavigator::SigninRedirect),
            Self::SigninResourceOwnerCredentials { .. } => {
                Some(ActiveNavigator::SigninResourceOwnerCredentials)
            }
            Self::SignoutPopup { .. } => Some(ActiveNavigator::SignoutPopup),
            Self::SignoutRedirect { .. } => Some(ActiveNavigator::SignoutRedirect),
            Self::SignoutSilent { .. } => Some(ActiveNavigator::SignoutSilent),
            Self::SigninCallback | Self::SignoutCallback | Self::RenewSilent | Self::Unknown => {
                None
            }
        }
    }

    pub fn carries_args(&self) -> bool {
        self.navigator().is_some()
    }

    /// The recorded arguments as JSON. `None` for argument-free sources,
    /// `Some(Ok(Null))` for a navigator called without arguments.
    pub fn args_json(&self) -> Option<serde_json::Result<serde_json::Value>> {
        fn to_json<T: Serialize>(args: &Option<T>) -> serde_json::Result<serde_json::Value> {
            serde_json::to_value(args)
        }

        match self {
            Self::SigninPopup { args } => Some(to_json(args)),
            Self::SigninSilent { args } => Some(to_json(args)),
            Self::SigninRedirect { args } => Some(to_json(args)),
            Self::SigninResourceOwnerCredentials { args } => Some(to_json(args)),
            Self::SignoutPopup { args } => Some(to_json(args)),
            Self::SignoutRedirect { args } => Some(to_json(args)),
            Self::SignoutSilent { args } => Some(to_json(args)),
            Self::SigninCallback | Self::SignoutCallback | Self::RenewSilent | Self::Unknown => {
                None
            }
        }
    }
}

impl std::fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A failed signin, signout or renew, tagged with the operation it came from.
///
/// Wire form: `{ name, message, source, args?, innerError? }`. `args` is
/// present (possibly `null`) for exactly the argument-carrying sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(
    rename_all = "camelCase",
    try_from = "serde_json::Map<String, serde_json::Value>"
)]
#[error("{origin} failed: {message}")]
pub struct ErrorContext {
    /// Error class name, `"Error"` unless the library reports a subclass.
    pub name: String,
    pub message: String,
    /// Lower-level cause, in whatever shape it arrived.
    #[serde(default, skip_serializing_if = "Slot::is_absent")]
    pub inner_error: Slot<serde_json::Value>,
    #[serde(flatten)]
    pub origin: ErrorSource,
}

impl ErrorContext {
    pub fn new(origin: ErrorSource, message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            inner_error: Slot::Absent,
            origin,
        }
    }

    /// Wraps a library failure, keeping its structured form as the inner error.
    pub fn from_failure(origin: ErrorSource, failure: &ManagerError) -> Self {
        Self {
            name: failure.name().to_string(),
            message: failure.to_string(),
            inner_error: serde_json::to_value(failure).map_or(Slot::Absent, Slot::Present),
            origin,
        }
    }

    pub fn source_tag(&self) -> &'static str {
        self.origin.tag()
    }
}

/// Mirror of the wire form used to parse before validating `args` presence.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorContextRepr {
    #[serde(default = "default_error_name")]
    name: String,
    message: String,
    #[serde(default)]
    inner_error: Slot<serde_json::Value>,
    #[serde(flatten)]
    origin: ErrorSource,
}

fn default_error_name() -> String {
    "Error".to_string()
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for ErrorContext {
    type Error = CoreError;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let has_args = map.contains_key("args");
        if let Some(tag) = map.get("source").and_then(serde_json::Value::as_str) {
            if !ErrorSource::TAGS.contains(&tag) {
                return Err(CoreError::UnknownSource(tag.to_string()));
            }
        }

        let repr: ErrorContextRepr = serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| CoreError::Malformed(e.to_string()))?;

        match (repr.origin.carries_args(), has_args) {
            (true, false) => return Err(CoreError::MissingArgs(repr.origin.tag())),
            (false, true) => return Err(CoreError::UnexpectedArgs(repr.origin.tag())),
            _ => {}
        }

        Ok(Self {
            name: repr.name,
            message: repr.message,
            inner_error: repr.inner_error,
            origin: repr.origin,
        })
    }
}
