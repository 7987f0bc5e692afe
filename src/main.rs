use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ck_core::ports::HistoryEvents;
use ck_core::Settings;
use ck_infra::{FsBlobSideStore, MonotonicClock};
use ck_platform::ClipboardRsAccess;
use clipkeep::bootstrap::{self, build_store, ensure_cache_folder, load_config, resolve_cache_folder};
use clipkeep::{Engine, EngineDeps};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "clipkeep", about = "Clipboard history daemon")]
struct Args {
    /// Settings file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the cache folder from the settings file.
    #[arg(long)]
    cache_folder: Option<PathBuf>,

    /// Start with clipboard capture paused.
    #[arg(long)]
    paused: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_config(path)?,
        None => Settings::default(),
    };
    if let Some(folder) = args.cache_folder {
        settings.storage.cache_folder_path = Some(folder);
    }
    if args.paused {
        settings.capture.enabled = false;
    }

    let cache_folder = resolve_cache_folder(&settings)?;
    ensure_cache_folder(&cache_folder)?;
    bootstrap::tracing::init_tracing_subscriber(&cache_folder)?;
    info!(cache_folder = %cache_folder.display(), "Starting clipkeep");

    let clock = Arc::new(MonotonicClock::system());
    let events = HistoryEvents::new();
    let store = build_store(&settings, cache_folder.clone(), clock.clone(), events.clone()).await?;
    let blobs = Arc::new(FsBlobSideStore::new(cache_folder));

    let engine = Engine::start(
        settings,
        EngineDeps {
            store,
            blobs,
            clock,
            events,
            clipboard: Arc::new(ClipboardRsAccess),
        },
    )?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    info!("Shutdown requested");
    engine.shutdown().await
}
