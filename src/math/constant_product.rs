// src/math/constant_product.rs
//
// Estimation pure du slippage d'un swap hypothétique sous l'invariant
// produit-constant (reserve_in * reserve_out = k). Aucun effet de bord :
// le résultat est purement consultatif (log), jamais une condition de
// persistance.

use crate::math::round_price;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlippageError {
    /// Le montant d'entrée doit être strictement positif.
    #[error("input amount must be strictly positive")]
    NonPositiveInput,
    /// Les deux réserves doivent être strictement positives.
    #[error("both reserves must be strictly positive")]
    EmptyReserves,
    /// Un intermédiaire (k, ratio) dépasse la capacité du type décimal.
    /// Des réserves en lamports de quelques centaines de milliers de SOL
    /// suffisent à faire déborder k : on échoue proprement, on ne panique
    /// jamais dans le chemin de réconciliation.
    #[error("intermediate arithmetic overflowed the decimal range")]
    ArithmeticOverflow,
}

/// Résultat détaillé de l'estimation, pour le logging.
#[derive(Debug, Clone, PartialEq)]
pub struct SlippageEstimate {
    pub spot_price: Decimal,
    pub effective_price: Decimal,
    pub output_amount: Decimal,
    pub slippage_pct: Decimal,
}

/// Estime le slippage (en %) d'un swap de `input_amount` contre un pool de
/// réserves (`liquidity_a`, `liquidity_b`), dans la direction `is_a_to_b`.
/// Pas de modèle de frais, pas de protection de profondeur au-delà des
/// préconditions.
pub fn estimate_slippage(
    liquidity_a: Decimal,
    liquidity_b: Decimal,
    input_amount: Decimal,
    is_a_to_b: bool,
) -> Result<SlippageEstimate, SlippageError> {
    if input_amount <= Decimal::ZERO {
        return Err(SlippageError::NonPositiveInput);
    }
    if liquidity_a <= Decimal::ZERO || liquidity_b <= Decimal::ZERO {
        return Err(SlippageError::EmptyReserves);
    }

    let (reserve_in, reserve_out) = if is_a_to_b {
        (liquidity_a, liquidity_b)
    } else {
        (liquidity_b, liquidity_a)
    };

    // Tout en arithmétique vérifiée : la multiplication Decimal panique en
    // cas de débordement, et k déborde bien avant les bornes i64 du décodeur.
    let k = reserve_in
        .checked_mul(reserve_out)
        .ok_or(SlippageError::ArithmeticOverflow)?;
    let new_reserve_in = reserve_in
        .checked_add(input_amount)
        .ok_or(SlippageError::ArithmeticOverflow)?;
    let new_reserve_out = round_price(
        k.checked_div(new_reserve_in)
            .ok_or(SlippageError::ArithmeticOverflow)?,
    );
    let output_amount = reserve_out - new_reserve_out;

    let spot_price = round_price(reserve_out / reserve_in);
    let effective_price = round_price(output_amount / input_amount);

    // `checked_div` couvre aussi un spot arrondi à zéro (réserves à des
    // ordres de grandeur extrêmes l'une de l'autre).
    let price_ratio = effective_price
        .checked_div(spot_price)
        .ok_or(SlippageError::ArithmeticOverflow)?;
    let slippage_pct = round_price(
        (Decimal::ONE - price_ratio)
            .abs()
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(SlippageError::ArithmeticOverflow)?,
    );

    Ok(SlippageEstimate {
        spot_price,
        effective_price,
        output_amount,
        slippage_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn estimates_slippage_for_reference_trade() {
        let estimate =
            estimate_slippage(dec!(1000000), dec!(500000), dec!(10000), true).unwrap();

        // k = 500_000_000_000 ; newReserveIn = 1_010_000 ;
        // newReserveOut = 495049.5049504950... -> 495049.50495050 en 8dp half-up.
        assert_eq!(estimate.output_amount, dec!(4950.49504950));
        assert_eq!(estimate.spot_price, dec!(0.50000000));
        assert_eq!(estimate.effective_price, dec!(0.49504950));
        assert_eq!(estimate.slippage_pct, dec!(0.99010000));
    }

    #[test]
    fn direction_flag_swaps_reserves() {
        let a_to_b = estimate_slippage(dec!(1000), dec!(2000), dec!(10), true).unwrap();
        let b_to_a = estimate_slippage(dec!(2000), dec!(1000), dec!(10), false).unwrap();
        assert_eq!(a_to_b, b_to_a);
    }

    #[test]
    fn rejects_non_positive_input() {
        assert_eq!(
            estimate_slippage(dec!(1000), dec!(1000), Decimal::ZERO, true),
            Err(SlippageError::NonPositiveInput)
        );
        assert_eq!(
            estimate_slippage(dec!(1000), dec!(1000), dec!(-5), true),
            Err(SlippageError::NonPositiveInput)
        );
    }

    #[test]
    fn rejects_empty_reserves() {
        assert_eq!(
            estimate_slippage(Decimal::ZERO, dec!(1000), dec!(10), true),
            Err(SlippageError::EmptyReserves)
        );
        assert_eq!(
            estimate_slippage(dec!(1000), Decimal::ZERO, dec!(10), false),
            Err(SlippageError::EmptyReserves)
        );
    }

    #[test]
    fn overflowing_reserves_fail_cleanly() {
        // 300k SOL en lamports de chaque côté : k dépasse Decimal::MAX.
        // L'estimation doit échouer en erreur, pas en panique.
        let reserves = dec!(300000000000000);
        assert_eq!(
            estimate_slippage(reserves, reserves, dec!(1000000), true),
            Err(SlippageError::ArithmeticOverflow)
        );
    }

    #[test]
    fn rounds_half_up_at_eight_decimals() {
        // 0.000000005 est exactement au milieu : half-up monte.
        assert_eq!(crate::math::round_price(dec!(0.000000005)), dec!(0.00000001));
        assert_eq!(crate::math::round_price(dec!(0.000000004)), dec!(0.00000000));
    }
}
