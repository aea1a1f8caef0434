use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use evepal::cache::CacheService;
use evepal::cli::{Cli, Commands, commands};
use evepal::config::Settings;
use evepal::esi::EsiClient;
use evepal::identity::AppIdentity;
use evepal::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            eprintln!("Run 'evepal init' to create a configuration file.");
            std::process::exit(1);
        }
    };

    logging::init_with_config(&settings.logging);

    // Configuration commands need no identity, lock, or network
    match &cli.command {
        Commands::Init { force } => {
            commands::run_init(*force);
            return Ok(());
        }
        Commands::Config => {
            commands::run_config(&settings);
            return Ok(());
        }
        _ => {}
    }

    let identity = AppIdentity::new(&settings.cache.dir);
    identity
        .acquire_lock()
        .context("another instance is already running")?;

    let esi = EsiClient::new(&settings.esi).context("failed to build ESI client")?;
    let mut service = CacheService::new(settings.clone(), identity, Box::new(esi.clone()));

    let result = match &cli.command {
        Commands::Sync { force } => commands::run_sync(&mut service, *force).await,
        Commands::Lookup { query } => commands::run_lookup(&mut service, query).await,
        Commands::Route { from, to, flag } => {
            commands::run_route(&mut service, &esi, &settings, from, to, *flag).await
        }
        Commands::Init { .. } | Commands::Config => unreachable!("handled above"),
    };

    // Final flush happens even when the command failed; lock release last
    let shutdown = service.shutdown();
    service.identity().release_lock();

    result?;
    shutdown.context("shutdown flush failed")?;
    Ok(())
}
