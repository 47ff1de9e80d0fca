use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studypath::cli::Cli;
use studypath::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.settings.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = commands::run(cli).await {
        eprintln!("{} {e}", "error:".red().bold());
        if let Some(hint) = e.hint() {
            eprintln!("{}", hint.dimmed());
        }
        std::process::exit(1);
    }
}
