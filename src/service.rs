// src/service.rs
//
// La façade requête/réponse au-dessus du store : les quatre opérations que
// la couche externe expose. Purement passe-plat, aucune logique métier —
// les échecs internes de réconciliation ne sont jamais visibles ici, un
// pool en échec est simplement "introuvable" ou inactif.

use crate::store::{Pool, PoolStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct PoolService {
    store: Arc<dyn PoolStore>,
}

impl PoolService {
    pub fn new(store: Arc<dyn PoolStore>) -> Self {
        Self { store }
    }

    /// "get pool by address" — None pour une adresse jamais vue.
    pub fn get_pool(&self, address: &str) -> Option<Pool> {
        self.store.get(address)
    }

    /// "list active pools".
    pub fn active_pools(&self) -> Vec<Pool> {
        self.store.list_active()
    }

    /// "get pool active status" — une adresse inconnue est inactive.
    pub fn is_active(&self, address: &str) -> bool {
        self.store.get(address).map(|p| p.active).unwrap_or(false)
    }

    /// "deactivate pool" — false si le pool est inconnu ou déjà inactif.
    pub fn deactivate(&self, address: &str) -> bool {
        if self.is_active(address) {
            self.store.mark_inactive(address)
        } else {
            false
        }
    }

    /// Pools dont l'un des côtés est le mint donné.
    pub fn pools_for_mint(&self, mint: &str) -> Vec<Pool> {
        self.store.find_by_mint(mint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPoolStore;

    fn service_with_pool(address: &str) -> PoolService {
        let store = Arc::new(MemoryPoolStore::new());
        store.upsert(Pool::new(address, 1));
        PoolService::new(store)
    }

    #[test]
    fn unknown_address_is_not_found_and_inactive() {
        let service = PoolService::new(Arc::new(MemoryPoolStore::new()));
        assert!(service.get_pool("missing").is_none());
        assert!(!service.is_active("missing"));
        assert!(!service.deactivate("missing"));
    }

    #[test]
    fn deactivate_flips_status_once() {
        let service = service_with_pool("addr");
        assert!(service.is_active("addr"));
        assert!(service.deactivate("addr"));
        assert!(!service.is_active("addr"));
        // Déjà inactif : la deuxième désactivation est un échec "not found".
        assert!(!service.deactivate("addr"));
        assert!(service.active_pools().is_empty());
    }
}
