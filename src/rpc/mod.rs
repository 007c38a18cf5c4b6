pub mod resilient_client;

pub use resilient_client::ResilientRpcClient;

use anyhow::Result;
use async_trait::async_trait;

/// Couture vers la source des données de compte on-chain. Le réconciliateur
/// ne dépend que de ce contrat; en production c'est un RPC Solana, en test
/// un mock qui sert des snapshots préfabriqués.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Récupère les bytes bruts du compte à l'adresse donnée.
    async fn fetch_raw(&self, address: &str) -> Result<Vec<u8>>;
}
