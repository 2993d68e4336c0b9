use std::sync::Arc;

use fleet_stops::config::AppConfig;
use fleet_stops::detector::StopDetector;
use fleet_stops::ingest::IngestionCoordinator;
use fleet_stops::store::postgres::PgStore;
use fleet_stops::{db, kafka};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Fleet Stops Service...");

    // Init DB
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    info!("Connected to database");

    // Wire stores, detector, coordinator
    let store = PgStore::new(pool);
    let detector = StopDetector::new(store.clone(), store.clone(), config.detector_config());
    let coordinator = Arc::new(IngestionCoordinator::new(store.clone(), store, detector));

    // Start consuming fixes
    kafka::start_fix_consumer(&config, coordinator).await?;

    Ok(())
}
