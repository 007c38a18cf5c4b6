// src/reconciler/mod.rs
//
// L'orchestrateur : une transaction de swap entre, une mise à jour validée
// du pool sort (ou pas). Chaque appel déroule la machine à états
// adresse -> fetch -> décodage -> identité/liquidité/prix/volume ->
// validation -> persistance, avec sortie anticipée bénigne (skip) ou
// échec journalisé. Rien ne remonte jamais jusqu'au feed.

pub mod validator;

pub use validator::PriceSanityValidator;

use crate::decoders::decode_reserves;
use crate::feed::{SwapTransaction, TokenTransfer};
use crate::math::{constant_product, round_price};
use crate::monitoring::metrics;
use crate::pipeline::RateLimiter;
use crate::rpc::AccountFetcher;
use crate::store::{Pool, PoolStore};
use anyhow::Result;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Sorties anticipées bénignes : la transaction ne nous concernait pas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingSignature,
    WrongType,
    NoPoolAddress,
    MissingTransfers,
}

impl SkipReason {
    fn metric_label(self) -> &'static str {
        match self {
            SkipReason::MissingSignature => "missing_signature",
            SkipReason::WrongType => "wrong_type",
            SkipReason::NoPoolAddress => "no_pool_address",
            SkipReason::MissingTransfers => "missing_transfers",
        }
    }
}

/// Résultat d'une réconciliation. Seul `Persisted` a écrit un nouvel état;
/// `Deactivated` a écrit la désactivation du pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Persisted,
    Skipped(SkipReason),
    /// Fetch ou décodage impossible : le pool n'est plus vérifiable
    /// on-chain, on le marque inactif plutôt que de garder des chiffres
    /// périmés (fail-closed).
    Deactivated,
    /// Prix candidat rejeté par le contrôle de cohérence; l'état persisté
    /// précédent reste d'autorité.
    Rejected,
    /// Pas de permis du rate limiter dans le délai : unité abandonnée,
    /// le pool reste intact.
    RateLimited,
}

// Fraction des réserves utilisée pour l'estimation consultative de
// slippage (1% du côté A).
const REFERENCE_TRADE_FRACTION: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub struct PoolReconciler {
    store: Arc<dyn PoolStore>,
    fetcher: Arc<dyn AccountFetcher>,
    rate_limiter: Arc<RateLimiter>,
    validator: PriceSanityValidator,
    // Sérialisation par adresse : deux réconciliations du même pool ne
    // doivent jamais entrelacer leur lecture-modification-écriture.
    address_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PoolReconciler {
    pub fn new(
        store: Arc<dyn PoolStore>,
        fetcher: Arc<dyn AccountFetcher>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            validator: PriceSanityValidator::new(store.clone()),
            store,
            fetcher,
            rate_limiter,
            address_locks: Mutex::new(HashMap::new()),
        }
    }

    fn address_lock(&self, address: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.address_locks.lock().unwrap();
        locks
            .entry(address.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn skip(reason: SkipReason) -> Result<ReconcileOutcome> {
        metrics::TRANSACTIONS_SKIPPED
            .with_label_values(&[reason.metric_label()])
            .inc();
        Ok(ReconcileOutcome::Skipped(reason))
    }

    /// Réconcilie l'état du pool désigné par une transaction de swap.
    pub async fn reconcile(&self, tx: &SwapTransaction) -> Result<ReconcileOutcome> {
        if tx.signature.is_empty() {
            warn!("Transaction sans signature, ignorée");
            return Self::skip(SkipReason::MissingSignature);
        }
        // Le filtrage est censé être fait en amont; on re-vérifie quand même.
        if !tx.is_swap() {
            debug!(signature = %tx.signature, tx_type = %tx.tx_type, "Type non-swap");
            return Self::skip(SkipReason::WrongType);
        }

        let Some(address) = tx.pool_address() else {
            debug!(signature = %tx.signature, "Aucune instruction Raydium exploitable");
            return Self::skip(SkipReason::NoPoolAddress);
        };
        let address = address.to_string();

        let lock = self.address_lock(&address);
        let _guard = lock.lock().await;

        let mut pool = self
            .store
            .get(&address)
            .unwrap_or_else(|| Pool::new(&address, unix_now()));

        // --- Identité ---
        let Some((mint_a, mint_b)) = observed_mints(&tx.token_transfers) else {
            debug!(signature = %tx.signature, pool = %address, "Transfers insuffisants pour l'identité");
            return Self::skip(SkipReason::MissingTransfers);
        };
        if pool.token_a_mint.as_deref() != Some(mint_a)
            || pool.token_b_mint.as_deref() != Some(mint_b)
        {
            info!(pool = %address, mint_a = %mint_a, mint_b = %mint_b, "Identité des tokens mise à jour");
            pool.token_a_mint = Some(mint_a.to_string());
            pool.token_b_mint = Some(mint_b.to_string());
        }

        // --- Liquidité (le seul point de suspension réseau, derrière le
        // rate limiter) ---
        if self.rate_limiter.acquire().await.is_err() {
            metrics::RATE_LIMIT_TIMEOUTS.inc();
            warn!(signature = %tx.signature, pool = %address, "Timeout du rate limiter, unité abandonnée");
            return Ok(ReconcileOutcome::RateLimited);
        }

        let raw = match self.fetcher.fetch_raw(&address).await {
            Ok(raw) => raw,
            Err(e) => return Ok(self.handle_update_error(pool, &e)),
        };
        let (reserve_a, reserve_b) = match decode_reserves(&raw) {
            Ok(reserves) => reserves,
            Err(e) => return Ok(self.handle_update_error(pool, &e)),
        };

        pool.liquidity_a = Some(reserve_a);
        pool.liquidity_b = Some(reserve_b);
        if reserve_b > Decimal::ZERO {
            pool.price = Some(round_price(reserve_a / reserve_b));
        }
        // reserve_b == 0 : on garde le prix précédent, jamais de division
        // par zéro, jamais d'écrasement à null.

        // --- Volume (accumulateur; un échantillon invalide saute cette
        // étape sans bloquer le reste) ---
        if let Some(amount) = tx
            .token_transfers
            .first()
            .and_then(|t| t.token_amount)
            .and_then(Decimal::from_f64)
        {
            if amount > Decimal::ZERO {
                pool.volume_24h += amount;
                debug!(pool = %address, amount = %amount, total = %pool.volume_24h, "Volume accumulé");
            }
        }

        // --- Validation contre le prix persisté ---
        if let Some(candidate) = pool.price {
            if !self.validator.validate(&address, candidate) {
                metrics::PRICE_REJECTIONS.inc();
                return Ok(ReconcileOutcome::Rejected);
            }
        }

        // --- Persistance ---
        pool.last_update = unix_now();
        self.store.upsert(pool.clone());
        metrics::POOLS_PERSISTED.inc();

        self.log_advisory_slippage(&pool);
        Ok(ReconcileOutcome::Persisted)
    }

    /// Politique fail-closed : un pool qu'on ne peut plus re-vérifier
    /// on-chain est marqué inactif et persisté tel quel. Pas de retour
    /// automatique à actif.
    fn handle_update_error(&self, mut pool: Pool, error: &anyhow::Error) -> ReconcileOutcome {
        metrics::DECODE_FAILURES.inc();
        warn!(pool = %pool.address, error = ?error, "Pool désactivé après échec de fetch/décodage");
        pool.active = false;
        self.store.upsert(pool);
        ReconcileOutcome::Deactivated
    }

    /// Estimation consultative du slippage pour un trade de référence (1%
    /// de la réserve A). Uniquement loggée, jamais utilisée pour valider ou
    /// persister quoi que ce soit.
    fn log_advisory_slippage(&self, pool: &Pool) {
        let (Some(liquidity_a), Some(liquidity_b)) = (pool.liquidity_a, pool.liquidity_b) else {
            return;
        };
        let input = round_price(liquidity_a * REFERENCE_TRADE_FRACTION);
        match constant_product::estimate_slippage(liquidity_a, liquidity_b, input, true) {
            Ok(estimate) => {
                info!(
                    pool = %pool.address,
                    input = %input,
                    slippage_pct = %estimate.slippage_pct,
                    spot_price = %estimate.spot_price,
                    "Estimation de slippage"
                );
            }
            Err(e) => {
                // Réserves vides ou trade nul : rien d'utile à logger.
                debug!(pool = %pool.address, error = %e, "Estimation de slippage sautée");
            }
        }
    }
}

/// Les deux premiers transfers portent l'identité (0 = entrant → mint A,
/// 1 = sortant → mint B). Moins de deux transfers ou un mint vide : pas
/// d'identité, l'appel s'arrête sans écrire.
fn observed_mints(transfers: &[TokenTransfer]) -> Option<(&str, &str)> {
    let [first, second, ..] = transfers else {
        return None;
    };
    if first.mint.is_empty() || second.mint.is_empty() {
        return None;
    }
    Some((&first.mint, &second.mint))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
