//! CLI error types.

use authstate_auth::ControllerError;
use authstate_core::auth::CoreError;
use thiserror::Error;

/// Result type alias for the CLI.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid --args JSON: {0}")]
    InvalidArgs(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("state observer failed: {0}")]
    Observer(#[from] tokio::task::JoinError),
}
