use authstate_core::auth::{ActiveNavigator, CoreError, ErrorContext};
use thiserror::Error;

/// Errors returned by `AuthController` operations.
///
/// Operation failures are also recorded in the controller's state; the
/// returned value is the same `ErrorContext` that consumers will observe.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The user manager rejected the operation.
    #[error(transparent)]
    Operation(#[from] ErrorContext),

    /// Another navigator was already in flight; nothing was started.
    #[error("{requested} rejected: {active} is already in flight")]
    NavigatorBusy {
        active: ActiveNavigator,
        requested: ActiveNavigator,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ControllerError {
    /// The recorded error context, for operation failures.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Operation(context) => Some(context),
            Self::NavigatorBusy { .. } | Self::Core(_) => None,
        }
    }
}

/// Invalid controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
