// src/store/mod.rs
//
// L'enregistrement Pool réconcilié et sa couture de persistance. Le Pool est
// la seule ressource mutable partagée du système; personne d'autre que le
// réconciliateur ne doit le modifier, et uniquement via get/upsert.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Un pool de liquidité suivi, clé primaire = adresse on-chain (44 chars,
/// immuable après création). Jamais supprimé, seulement désactivé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    pub token_a_mint: Option<String>,
    pub token_b_mint: Option<String>,
    /// Prix du token A en tokens B, 8 décimales half-up, toujours dérivé
    /// des réserves, jamais fourni par l'extérieur.
    pub price: Option<Decimal>,
    pub liquidity_a: Option<Decimal>,
    pub liquidity_b: Option<Decimal>,
    /// Malgré le nom : accumulateur cumulatif des montants entrants, pas une
    /// fenêtre glissante de 24h. Comportement hérité, à ne pas "corriger"
    /// sans demande explicite.
    pub volume_24h: Decimal,
    /// Timestamp unix (secondes) de la dernière réconciliation réussie.
    pub last_update: i64,
    /// Passe à false sur échec de fetch/décodage; aucun retour automatique
    /// à true.
    pub active: bool,
}

impl Pool {
    /// Pool créé paresseusement à la première transaction qui le référence.
    pub fn new(address: impl Into<String>, now: i64) -> Self {
        Self {
            address: address.into(),
            token_a_mint: None,
            token_b_mint: None,
            price: None,
            liquidity_a: None,
            liquidity_b: None,
            volume_24h: Decimal::ZERO,
            last_update: now,
            active: true,
        }
    }
}

/// Contrat du store de pools. L'implémentation de production peut être une
/// base externe; le moteur n'a besoin que de ces opérations.
pub trait PoolStore: Send + Sync {
    fn get(&self, address: &str) -> Option<Pool>;
    fn upsert(&self, pool: Pool);
    fn list_active(&self) -> Vec<Pool>;
    /// Retourne false si l'adresse est inconnue.
    fn mark_inactive(&self, address: &str) -> bool;
    /// Pools dont l'un des deux côtés est le mint donné.
    fn find_by_mint(&self, mint: &str) -> Vec<Pool>;
}

/// Store en mémoire, suffisant pour le service et pour les tests.
pub struct MemoryPoolStore {
    pools: RwLock<HashMap<String, Pool>>,
}

impl Default for MemoryPoolStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPoolStore {
    pub fn new() -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
        }
    }
}

impl PoolStore for MemoryPoolStore {
    fn get(&self, address: &str) -> Option<Pool> {
        let reader = self.pools.read().unwrap();
        reader.get(address).cloned()
    }

    fn upsert(&self, pool: Pool) {
        let mut writer = self.pools.write().unwrap();
        writer.insert(pool.address.clone(), pool);
    }

    fn list_active(&self) -> Vec<Pool> {
        let reader = self.pools.read().unwrap();
        reader.values().filter(|p| p.active).cloned().collect()
    }

    fn mark_inactive(&self, address: &str) -> bool {
        let mut writer = self.pools.write().unwrap();
        match writer.get_mut(address) {
            Some(pool) => {
                pool.active = false;
                true
            }
            None => false,
        }
    }

    fn find_by_mint(&self, mint: &str) -> Vec<Pool> {
        let reader = self.pools.read().unwrap();
        reader
            .values()
            .filter(|p| {
                p.token_a_mint.as_deref() == Some(mint)
                    || p.token_b_mint.as_deref() == Some(mint)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn upsert_then_get_returns_latest_state() {
        let store = MemoryPoolStore::new();
        let mut pool = Pool::new("addr1", 100);
        store.upsert(pool.clone());

        pool.volume_24h = dec!(42);
        store.upsert(pool.clone());

        assert_eq!(store.get("addr1"), Some(pool));
        assert_eq!(store.get("unknown"), None);
    }

    #[test]
    fn list_active_excludes_deactivated_pools() {
        let store = MemoryPoolStore::new();
        store.upsert(Pool::new("a", 1));
        store.upsert(Pool::new("b", 1));
        assert!(store.mark_inactive("b"));

        let active = store.list_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].address, "a");
    }

    #[test]
    fn mark_inactive_on_unknown_address_is_false() {
        let store = MemoryPoolStore::new();
        assert!(!store.mark_inactive("missing"));
    }

    #[test]
    fn find_by_mint_matches_either_side() {
        let store = MemoryPoolStore::new();
        let mut pool = Pool::new("a", 1);
        pool.token_a_mint = Some("mintX".to_string());
        pool.token_b_mint = Some("mintY".to_string());
        store.upsert(pool);

        assert_eq!(store.find_by_mint("mintX").len(), 1);
        assert_eq!(store.find_by_mint("mintY").len(), 1);
        assert!(store.find_by_mint("mintZ").is_empty());
    }
}
