use crate::monitoring::metrics;
use crate::rpc::AccountFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::pubkey::Pubkey;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::time::sleep;

/// Un "wrapper" autour du RpcClient de Solana qui ajoute une logique de
/// ré-essai automatique pour les appels RPC qui échouent à cause d'erreurs
/// réseau temporaires.
#[derive(Clone)]
pub struct ResilientRpcClient {
    client: Arc<RpcClient>,
    max_retries: u8,
    delay_ms: u64,
}

impl ResilientRpcClient {
    /// Construit un nouveau client RPC résilient.
    pub fn new(rpc_url: String, max_retries: u8, delay_ms: u64) -> Self {
        Self {
            client: Arc::new(RpcClient::new(rpc_url)),
            max_retries,
            delay_ms,
        }
    }

    /// Détermine si une erreur du client est temporaire et si une nouvelle
    /// tentative doit être effectuée.
    fn is_retryable(error: &ClientError) -> bool {
        matches!(
            error.kind,
            ClientErrorKind::Reqwest(_) | ClientErrorKind::RpcError(_) | ClientErrorKind::Io(_)
        )
    }

    // --- MÉTHODES WRAPPÉES AVEC LOGIQUE DE RÉ-ESSAI ---

    /// Récupère les données brutes d'un compte.
    pub async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Vec<u8>> {
        for attempt in 0..=self.max_retries {
            match self.client.get_account_data(pubkey).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    if Self::is_retryable(&e) && attempt < self.max_retries {
                        sleep(Duration::from_millis(self.delay_ms)).await;
                    } else {
                        return Err(e)
                            .with_context(|| format!("Échec final de get_account_data pour {}", pubkey));
                    }
                }
            }
        }
        unreachable!()
    }

}

#[async_trait]
impl AccountFetcher for ResilientRpcClient {
    async fn fetch_raw(&self, address: &str) -> Result<Vec<u8>> {
        let pubkey = Pubkey::from_str(address)
            .with_context(|| format!("Adresse de pool invalide: {}", address))?;
        let timer = metrics::ACCOUNT_FETCH_LATENCY.start_timer();
        let result = self.get_account_data(&pubkey).await;
        timer.observe_duration();
        result
    }
}
