// src/pipeline/mod.rs
//
// Le pool de workers qui consomme le feed, borné par un sémaphore, et le
// rate limiter en fenêtre fixe qui protège le quota du fetch de comptes.
// Le limiteur est un composant explicite construit depuis la config et
// injecté — pas un singleton de processus.

use crate::config::Config;
use crate::feed::SwapTransaction;
use crate::monitoring::metrics;
use crate::reconciler::{PoolReconciler, ReconcileOutcome};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// L'acquisition d'un permis a dépassé le timeout : l'unité de travail est
/// abandonnée, jamais re-tentée.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("rate limiter acquire timed out")]
pub struct RateLimitTimeout;

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub permits: u32,
    pub window: Duration,
    pub acquire_timeout: Duration,
}

impl RateLimiterConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            permits: config.rate_limit_permits,
            window: Duration::from_secs(config.rate_limit_window_secs),
            acquire_timeout: Duration::from_millis(config.rate_limit_timeout_ms),
        }
    }
}

struct WindowState {
    window_start: Instant,
    used: u32,
}

/// Token bucket en fenêtre fixe : N permis par fenêtre, l'acquisition bloque
/// jusqu'au timeout configuré puis échoue.
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                used: 0,
            }),
            config,
        }
    }

    /// Prend un permis, en attendant au plus `acquire_timeout`.
    pub async fn acquire(&self) -> Result<(), RateLimitTimeout> {
        tokio::time::timeout(self.config.acquire_timeout, self.acquire_inner())
            .await
            .map_err(|_| RateLimitTimeout)
    }

    async fn acquire_inner(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                if now.duration_since(state.window_start) >= self.config.window {
                    state.window_start = now;
                    state.used = 0;
                }
                if state.used < self.config.permits {
                    state.used += 1;
                    return;
                }
                self.config.window - now.duration_since(state.window_start)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

/// Pool de workers : une réconciliation par transaction, concurrence bornée,
/// échecs isolés et avalés au niveau de l'unité. Le feed ne s'arrête jamais
/// pour une transaction ratée.
pub struct WorkerPool {
    reconciler: Arc<PoolReconciler>,
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(reconciler: Arc<PoolReconciler>, concurrency: usize) -> Self {
        Self {
            reconciler,
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// Dispatch une transaction vers un worker. Bloque uniquement si toute
    /// la concurrence est occupée.
    pub async fn dispatch(&self, transaction: SwapTransaction) {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore never closed");
        let reconciler = self.reconciler.clone();

        tokio::spawn(async move {
            let signature = transaction.signature.clone();
            match reconciler.reconcile(&transaction).await {
                Ok(ReconcileOutcome::Persisted) => {
                    info!(signature = %signature, "Pool réconcilié et persisté");
                }
                Ok(outcome) => {
                    debug!(signature = %signature, ?outcome, "Réconciliation sans écriture");
                }
                Err(e) => {
                    // Rien ne remonte au-delà du worker : on logge et le feed
                    // continue avec la transaction suivante.
                    error!(signature = %signature, error = ?e, "Erreur de réconciliation");
                }
            }
            drop(permit);
        });
    }

    /// Consomme un lot de transactions du feed : filtre les swaps et
    /// dispatch le reste. Le réconciliateur re-vérifie le type de toute
    /// façon (défense en profondeur).
    pub async fn process_batch(&self, transactions: Vec<SwapTransaction>) {
        for tx in transactions {
            metrics::TRANSACTIONS_SEEN.inc();
            if !tx.is_swap() {
                warn!(signature = %tx.signature, tx_type = %tx.tx_type, "Transaction non-swap ignorée");
                metrics::TRANSACTIONS_SKIPPED
                    .with_label_values(&["wrong_type"])
                    .inc();
                continue;
            }
            self.dispatch(tx).await;
        }
    }
}
