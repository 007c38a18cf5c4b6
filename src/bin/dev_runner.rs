// src/bin/dev_runner.rs
//
// Banc d'essai manuel contre la vraie API : une passe de fetch + une
// réconciliation séquentielle, puis dump de l'état du store.

use anyhow::Result;
use pool_watcher::{
    config::Config,
    feed::{helius::HeliusFeed, RAYDIUM_AMM_PROGRAM_ID},
    pipeline::{RateLimiter, RateLimiterConfig},
    reconciler::PoolReconciler,
    rpc::ResilientRpcClient,
    service::PoolService,
    store::MemoryPoolStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    println!("\n--- Banc d'essai Pool Watcher ---");
    println!("[1/3] Fetch de l'historique Raydium...");
    let feed = HeliusFeed::new(config.helius_api_base_url.clone(), config.helius_api_key.clone());
    let transactions = feed.fetch_recent(RAYDIUM_AMM_PROGRAM_ID).await?;
    let swaps: Vec<_> = transactions.into_iter().filter(|tx| tx.is_swap()).collect();
    println!("-> {} swap(s) dans le batch.", swaps.len());

    println!("[2/3] Réconciliation séquentielle...");
    let store = Arc::new(MemoryPoolStore::new());
    let rpc_client = Arc::new(ResilientRpcClient::new(
        config.solana_rpc_url.clone(),
        config.rpc_max_retries,
        config.rpc_retry_delay_ms,
    ));
    let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig::from_config(&config)));
    let reconciler = PoolReconciler::new(store.clone(), rpc_client, rate_limiter);

    for tx in &swaps {
        match reconciler.reconcile(tx).await {
            Ok(outcome) => println!("  {} -> {:?}", tx.signature, outcome),
            Err(e) => println!("  {} -> ERREUR: {:?}", tx.signature, e),
        }
    }

    println!("[3/3] État du store :");
    let service = PoolService::new(store);
    for pool in service.active_pools() {
        println!(
            "  {} | A={:?} B={:?} | prix={:?} | volume={}",
            pool.address, pool.token_a_mint, pool.token_b_mint, pool.price, pool.volume_24h
        );
    }

    Ok(())
}
