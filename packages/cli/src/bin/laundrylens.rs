// ABOUTME: LaundryLens command line entry point
// ABOUTME: Loads .env, installs logging, and dispatches serve, migrate, and seed

use anyhow::Context;
use clap::{Parser, Subcommand};
use laundrylens_config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "laundrylens")]
#[command(about = "LaundryLens care label analysis backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (defaults to PORT or 3000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Insert or refresh the bundled symbol and material catalog
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { port } => laundrylens_cli::run_server(config, port)
            .await
            .context("Server failed")?,
        Commands::Migrate => laundrylens_cli::run_migrations(&config)
            .await
            .context("Migration failed")?,
        Commands::Seed => {
            let report = laundrylens_cli::run_seed(&config)
                .await
                .context("Seeding failed")?;
            println!(
                "Seeded {} symbols and {} materials",
                report.symbols, report.materials
            );
        }
    }

    Ok(())
}
