//! authstate_client - CLI for inspecting and simulating OIDC auth state.

pub mod cli;
pub mod error;
pub mod output;
pub mod report;
pub mod simulate;

pub use error::{CliError, Result};
pub use simulate::SimulationReport;
