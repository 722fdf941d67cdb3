//! authstate CLI entry point.

use anyhow::Result;
use authstate_client::cli::{Cli, Commands};
use authstate_client::output::{pretty, render};
use authstate_client::report::{TagList, UrlCheck};
use authstate_core::auth::{initial_auth_state, ResponseMode};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "authstate=warn" } else { "authstate=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Initial => {
            println!(
                "{}",
                render(&initial_auth_state(), cli.format, pretty::format_state)
            );
        }
        Commands::Tags => {
            println!("{}", render(&TagList::collect(), cli.format, pretty::format_tags));
        }
        Commands::CheckUrl { url, fragment } => {
            let mode = if fragment {
                ResponseMode::Fragment
            } else {
                ResponseMode::Query
            };
            let check = UrlCheck::new(url, mode);
            println!("{}", render(&check, cli.format, pretty::format_url_check));
        }
        Commands::Simulate(cmd) => {
            let report = authstate_client::simulate::run(&cmd).await?;
            println!("{}", render(&report, cli.format, pretty::format_report));
            report.ensure_succeeded()?;
        }
    }

    Ok(())
}
