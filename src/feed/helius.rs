// src/feed/helius.rs

use crate::feed::SwapTransaction;
use anyhow::{Context, Result};
use tracing::debug;

/// Client du feed de transactions Helius. Il ne connaît que l'endpoint
/// d'historique d'adresse; le parsing JSON se fait directement dans le
/// modèle `SwapTransaction`.
#[derive(Clone)]
pub struct HeliusFeed {
    http: reqwest::Client,
    api_base_url: String,
    api_key: String,
}

impl HeliusFeed {
    pub fn new(api_base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url,
            api_key,
        }
    }

    /// Construit l'URL de l'historique de transactions pour une adresse.
    fn transaction_history_url(&self, address: &str) -> String {
        format!(
            "{}/v0/addresses/{}/transactions/?api-key={}",
            self.api_base_url, address, self.api_key
        )
    }

    /// Récupère les transactions récentes qui touchent `program_address`.
    /// Le filtrage SWAP appartient à l'appelant (le réconciliateur re-vérifie
    /// de toute façon).
    pub async fn fetch_recent(&self, program_address: &str) -> Result<Vec<SwapTransaction>> {
        let url = self.transaction_history_url(program_address);
        let transactions: Vec<SwapTransaction> = self
            .http
            .get(&url)
            .send()
            .await
            .context("Échec de la requête d'historique Helius")?
            .error_for_status()
            .context("L'API Helius a répondu avec un statut d'erreur")?
            .json()
            .await
            .context("Réponse Helius illisible")?;

        debug!(count = transactions.len(), "Transactions reçues du feed");
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_history_url_with_api_key() {
        let feed = HeliusFeed::new("https://api.helius.xyz".to_string(), "secret".to_string());
        assert_eq!(
            feed.transaction_history_url("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8"),
            "https://api.helius.xyz/v0/addresses/675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8/transactions/?api-key=secret"
        );
    }
}
