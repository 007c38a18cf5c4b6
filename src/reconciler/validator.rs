// src/reconciler/validator.rs

use crate::store::PoolStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

/// Garde-fou contre les prix issus d'un décodage corrompu : un saut relatif
/// de plus de 20% par rapport au dernier prix *persisté* est rejeté avant
/// d'atteindre le store. La borne est inclusive : exactement 20% passe.
pub struct PriceSanityValidator {
    store: Arc<dyn PoolStore>,
}

impl PriceSanityValidator {
    pub fn new(store: Arc<dyn PoolStore>) -> Self {
        Self { store }
    }

    /// Écart relatif maximal toléré (0.20).
    fn max_relative_change() -> Decimal {
        Decimal::new(20, 2)
    }

    /// Vrai si le prix candidat est acceptable pour ce pool. On relit le
    /// prix depuis le store, pas depuis l'état en cours de mutation, pour
    /// éviter de se comparer à sa propre écriture dans le même appel.
    pub fn validate(&self, address: &str, candidate: Decimal) -> bool {
        let persisted = self.store.get(address).and_then(|pool| pool.price);
        let Some(previous) = persisted else {
            // Premier prix observé : tout est acceptable.
            return true;
        };
        if previous <= Decimal::ZERO {
            return true;
        }

        let relative_change = ((candidate - previous) / previous).abs();
        if relative_change > Self::max_relative_change() {
            warn!(
                pool = %address,
                previous = %previous,
                candidate = %candidate,
                change = %relative_change,
                "Prix candidat rejeté (saut suspect)"
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryPoolStore, Pool};
    use rust_decimal_macros::dec;

    fn store_with_price(address: &str, price: Decimal) -> Arc<MemoryPoolStore> {
        let store = Arc::new(MemoryPoolStore::new());
        let mut pool = Pool::new(address, 0);
        pool.price = Some(price);
        store.upsert(pool);
        store
    }

    #[test]
    fn accepts_any_price_without_previous() {
        let store = Arc::new(MemoryPoolStore::new());
        let validator = PriceSanityValidator::new(store);
        assert!(validator.validate("addr", dec!(123.45)));
    }

    #[test]
    fn rejects_change_above_twenty_percent() {
        let validator = PriceSanityValidator::new(store_with_price("addr", dec!(1.0)));
        assert!(!validator.validate("addr", dec!(1.25)));
        assert!(!validator.validate("addr", dec!(0.75)));
    }

    #[test]
    fn boundary_twenty_percent_is_accepted() {
        let validator = PriceSanityValidator::new(store_with_price("addr", dec!(1.0)));
        assert!(validator.validate("addr", dec!(1.20)));
        assert!(validator.validate("addr", dec!(0.80)));
    }
}
