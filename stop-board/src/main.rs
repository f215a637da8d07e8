use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stop_board::config::AppConfig;
use stop_board::directory::{DirectoryClient, StopDirectory};
use stop_board::favorites::{FavoritesStore, PendingFavoriteSlot};
use stop_board::storage::{FileSlots, SlotStorage};
use stop_board::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stop_board=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "stop board exited");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Favorites and the pending handoff share one data directory
    let storage: Arc<dyn SlotStorage> = Arc::new(FileSlots::new(config.data_dir.clone()));
    let favorites = FavoritesStore::open(storage.clone())?;
    let pending = PendingFavoriteSlot::new(storage);
    info!(data_dir = %config.data_dir.display(), "opened favorites");

    let client = DirectoryClient::new(config.directory.clone())?;
    let directory = StopDirectory::new(client);

    let state = AppState::new(directory, favorites, pending);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "stop board listening");
    info!("open http://{}/stops in your browser", config.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
