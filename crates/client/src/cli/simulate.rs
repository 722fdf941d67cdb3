//! Simulate CLI command.

use authstate_core::auth::{ActiveNavigator, ErrorPolicy};
use clap::{Parser, ValueEnum};

/// Run a navigator operation and print every state it publishes.
#[derive(Debug, Parser)]
pub struct SimulateCommand {
    /// Operation to run.
    pub operation: Operation,

    /// Operation arguments as JSON.
    #[arg(long)]
    pub args: Option<String>,

    /// Make the operation fail with this message.
    #[arg(long)]
    pub fail: Option<String>,

    /// When a recorded error is cleared.
    #[arg(long, env = "AUTH_ERROR_POLICY", default_value = "clear")]
    pub policy: PolicyArg,

    /// Start with a signed-in user.
    #[arg(long)]
    pub signed_in: bool,

    /// Simulated time the operation takes, in milliseconds.
    #[arg(long, default_value_t = 50)]
    pub latency_ms: u64,
}

/// Navigator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    SigninPopup,
    SigninSilent,
    SigninRedirect,
    SigninResourceOwnerCredentials,
    SignoutPopup,
    SignoutRedirect,
    SignoutSilent,
}

impl From<Operation> for ActiveNavigator {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::SigninPopup => ActiveNavigator::SigninPopup,
            Operation::SigninSilent => ActiveNavigator::SigninSilent,
            Operation::SigninRedirect => ActiveNavigator::SigninRedirect,
            Operation::SigninResourceOwnerCredentials => {
                ActiveNavigator::SigninResourceOwnerCredentials
            }
            Operation::SignoutPopup => ActiveNavigator::SignoutPopup,
            Operation::SignoutRedirect => ActiveNavigator::SignoutRedirect,
            Operation::SignoutSilent => ActiveNavigator::SignoutSilent,
        }
    }
}

/// Error policy options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Clear the error when a navigator begins.
    #[default]
    Clear,
    /// Keep the error until cleared or a user loads.
    Retain,
}

impl From<PolicyArg> for ErrorPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Clear => ErrorPolicy::ClearOnBegin,
            PolicyArg::Retain => ErrorPolicy::Retain,
        }
    }
}
