use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use zkcraft_asset_sync::config::EngineConfig;
use zkcraft_asset_sync::ledger::{HttpLedgerClient, LedgerClient};
use zkcraft_asset_sync::store::AssetStore;
use zkcraft_asset_sync::sync::engine::AssetSyncEngine;
use zkcraft_asset_sync::sync::monitor::AvailabilityMonitor;
use zkcraft_asset_sync::sync::poller::ReconciliationPoller;
use zkcraft_asset_sync::sync::side_effects::LoggingRankSideEffects;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::time())
        .init();

    info!("Starting asset sync service");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = match EngineConfig::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load {}: {}", config_path, e);
            return;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        error!("Failed to create data dir {:?}: {}", config.data_dir, e);
        return;
    }

    let store = AssetStore::open(&config.data_dir);
    let monitor = AvailabilityMonitor::new();

    let (ledger, config_error): (Option<Arc<dyn LedgerClient>>, Option<String>) =
        match config.ledger.validate() {
            Ok(()) => (
                Some(Arc::new(HttpLedgerClient::new(
                    config.ledger.rpc_url.clone(),
                    config.ledger.contract_address.clone(),
                ))),
                None,
            ),
            Err(e) => (None, Some(e.to_string())),
        };

    let engine = Arc::new(AssetSyncEngine::new(
        &config.data_dir,
        ledger,
        store,
        monitor,
        Arc::new(LoggingRankSideEffects),
    ));

    if let Some(reason) = config_error {
        engine.report_misconfigured(&reason);
        warn!("Running in offline-only mode; asset writes will be cached locally");
    } else if engine.probe().await {
        info!("Ledger reachable (chain id {})", config.ledger.chain_id);
    } else {
        warn!("Ledger not reachable yet; starting offline");
    }

    let poller = ReconciliationPoller::new(
        engine.clone(),
        Duration::from_secs(config.poll_interval_secs),
    );
    poller.resume();

    info!("Asset sync service running; press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    poller.pause();
    info!("Asset sync service stopped");
}
