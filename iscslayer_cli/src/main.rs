mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "iscslayer")]
#[command(about = "Batch-enrich insurance policy data from the ISC portal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a CSV of policy numbers against the portal
    Run(commands::run::RunArgs),
    /// Write a starter input CSV
    Template(commands::template::TemplateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("iscslayer_lib=info".parse().unwrap())
                .add_directive("iscslayer_api=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(args) => commands::run::run(args).await?,
        Commands::Template(args) => commands::template::run(args)?,
    }

    Ok(())
}
