// src/bin/pool_watcher.rs
//
// Le service : boucle de polling de l'historique Helius, filtre les swaps
// et dispatch chaque transaction vers le pool de workers.

use anyhow::Result;
use pool_watcher::{
    config::Config,
    feed::{helius::HeliusFeed, RAYDIUM_AMM_PROGRAM_ID},
    monitoring::{logging, metrics},
    pipeline::{RateLimiter, RateLimiterConfig, WorkerPool},
    reconciler::PoolReconciler,
    rpc::ResilientRpcClient,
    store::{MemoryPoolStore, PoolStore},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    logging::setup_logging();
    let config = Config::load()?;
    info!(
        program = RAYDIUM_AMM_PROGRAM_ID,
        concurrency = config.worker_concurrency,
        "Démarrage du pool watcher"
    );

    tokio::spawn(metrics::serve_metrics(config.metrics_port));

    let store = Arc::new(MemoryPoolStore::new());
    let rpc_client = Arc::new(ResilientRpcClient::new(
        config.solana_rpc_url.clone(),
        config.rpc_max_retries,
        config.rpc_retry_delay_ms,
    ));
    let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig::from_config(&config)));
    let reconciler = Arc::new(PoolReconciler::new(
        store.clone(),
        rpc_client,
        rate_limiter,
    ));
    let workers = WorkerPool::new(reconciler, config.worker_concurrency);
    let feed = HeliusFeed::new(config.helius_api_base_url.clone(), config.helius_api_key.clone());

    let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    loop {
        interval.tick().await;
        match feed.fetch_recent(RAYDIUM_AMM_PROGRAM_ID).await {
            Ok(transactions) => workers.process_batch(transactions).await,
            Err(e) => {
                // Un batch raté n'arrête pas la boucle, on retentera au
                // prochain tick.
                error!(error = ?e, "Échec du fetch du feed");
            }
        }
        metrics::ACTIVE_POOL_COUNT.set(store.list_active().len() as i64);
    }
}
