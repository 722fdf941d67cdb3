//! CLI command definitions.

pub mod simulate;

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

/// Inspect and simulate OIDC auth state.
#[derive(Debug, Parser)]
#[command(name = "authstate")]
#[command(version, about = "Inspect and simulate OIDC auth state", long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, env = "AUTHSTATE_FORMAT", default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the state before the library has initialized.
    Initial,
    /// List navigator and error source tags.
    Tags,
    /// Check whether a URL carries authorization callback parameters.
    CheckUrl {
        /// URL to inspect.
        url: Url,
        /// Read parameters from the fragment instead of the query.
        #[arg(long)]
        fragment: bool,
    },
    /// Run one navigator against the mock user manager.
    Simulate(simulate::SimulateCommand),
}
