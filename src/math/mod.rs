pub mod constant_product;

use rust_decimal::{Decimal, RoundingStrategy};

/// Précision des prix persistés et de tous les intermédiaires de pricing.
pub const PRICE_SCALE: u32 = 8;

/// Arrondi "half-up" à 8 décimales, identique partout où un prix ou un
/// ratio est calculé. Un autre mode d'arrondi casserait le test de
/// frontière du contrôle de cohérence de prix.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
