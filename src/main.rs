mod config;
mod routes;
mod server;
mod state;
mod updater;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lolcal_core::cache::CalendarCache;
use lolcal_core::client::ScheduleApi;
use lolcal_core::store::Store;
use lolcal_core::sync::Synchronizer;

use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "lolcal")]
#[command(about = "Sync the LoL esports schedule and serve it as an iCalendar feed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server together with the periodic schedule refresh
    Serve,
    /// Run one synchronization pass and exit
    Sync,
    /// Drop and recreate all tables (destructive)
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let store = Arc::new(Store::open(Path::new(&config.db_path))?);
    let cache = Arc::new(CalendarCache::new());

    match cli.command {
        Commands::Serve => {
            let api = ScheduleApi::new(&config.api_base_url, &config.api_key, &config.user_agent)?;
            let sync = Synchronizer::new(api, store.clone(), cache.clone());
            let _updater = updater::spawn(sync, Duration::from_secs(config.sync_interval_secs));
            server::serve(AppState::new(store, cache), config.port).await
        }
        Commands::Sync => {
            let api = ScheduleApi::new(&config.api_base_url, &config.api_key, &config.user_agent)?;
            let sync = Synchronizer::new(api, store, cache);
            let stats = sync.sync_all().await?;
            info!(
                leagues = stats.leagues,
                matches = stats.matches,
                skipped = stats.skipped,
                "sync complete"
            );
            Ok(())
        }
        Commands::Reset => {
            store.reset()?;
            cache.clear();
            warn!("dropped and recreated all tables");
            Ok(())
        }
    }
}
