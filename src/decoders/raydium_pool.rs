// src/decoders/raydium_pool.rs
//
// Décodeur du compte d'état d'un pool Raydium. Le layout est fixé par le
// programme externe (little-endian, comme tout l'état on-chain Solana) :
//
//   [0, 32)    authority      — ignoré
//   [32, 33)   status         — ignoré
//   [33, 65)   token A mint   — ignoré (l'identité vient des transfers)
//   [65, 97)   token B mint   — ignoré
//   [97, 105)  reserve A, entier signé 64 bits
//   [105, 113) reserve B, entier signé 64 bits
//
// Le compte réel continue au-delà (champs de frais, etc.) que l'on ne lit
// pas; 192 bytes est le minimum qui couvre tout le schéma déclaré.

use anyhow::{bail, Result};
use bytemuck::{from_bytes, Pod, Zeroable};
use rust_decimal::Decimal;

/// Taille minimale acceptée pour un compte de pool. Un buffer plus court est
/// un échec de décodage avant toute lecture d'offset.
pub const MIN_ACCOUNT_DATA_LEN: usize = 192;

// --- STRUCTURE DE DONNÉES BRUTES (miroir exact du layout on-chain) ---
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
struct RaydiumPoolStateData {
    authority: [u8; 32],
    status: u8,
    token_a_mint: [u8; 32],
    token_b_mint: [u8; 32],
    reserve_a: i64,
    reserve_b: i64,
}

const POOL_STATE_PREFIX_LEN: usize = std::mem::size_of::<RaydiumPoolStateData>();
const _: () = assert!(POOL_STATE_PREFIX_LEN == 113);

/// Décode les réserves `(reserve_a, reserve_b)` depuis les bytes bruts du
/// compte. Les valeurs sont des entiers 64 bits exposés en décimal exact,
/// sans mise à l'échelle par les `decimals` des tokens (c'est à l'appelant
/// de le faire s'il veut des montants "humains").
pub fn decode_reserves(data: &[u8]) -> Result<(Decimal, Decimal)> {
    if data.len() < MIN_ACCOUNT_DATA_LEN {
        bail!(
            "Données de compte trop courtes: attendu >= {}, reçu {}",
            MIN_ACCOUNT_DATA_LEN,
            data.len()
        );
    }

    let state: &RaydiumPoolStateData = from_bytes(&data[..POOL_STATE_PREFIX_LEN]);

    // Copie locale obligatoire : les champs d'une struct packed ne sont pas
    // alignés et ne peuvent pas être empruntés directement.
    let reserve_a = state.reserve_a;
    let reserve_b = state.reserve_b;

    // Une réserve négative ne peut être que du garbage de décodage; on
    // refuse, on ne tronque jamais à zéro.
    if reserve_a < 0 || reserve_b < 0 {
        bail!(
            "Réserves décodées négatives: A={}, B={}",
            reserve_a,
            reserve_b
        );
    }

    Ok((Decimal::from(reserve_a), Decimal::from(reserve_b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const RESERVE_A_OFFSET: usize = 97;
    const RESERVE_B_OFFSET: usize = 105;

    fn account_data(reserve_a: i64, reserve_b: i64) -> Vec<u8> {
        let mut data = vec![0u8; MIN_ACCOUNT_DATA_LEN];
        data[RESERVE_A_OFFSET..RESERVE_A_OFFSET + 8].copy_from_slice(&reserve_a.to_le_bytes());
        data[RESERVE_B_OFFSET..RESERVE_B_OFFSET + 8].copy_from_slice(&reserve_b.to_le_bytes());
        data
    }

    #[test]
    fn decodes_reserves_at_fixed_offsets() {
        let data = account_data(100_000_000, 50_000_000);
        let (reserve_a, reserve_b) = decode_reserves(&data).unwrap();
        assert_eq!(reserve_a, dec!(100000000));
        assert_eq!(reserve_b, dec!(50000000));
    }

    #[test]
    fn rejects_buffer_shorter_than_minimum() {
        assert!(decode_reserves(&[]).is_err());
        assert!(decode_reserves(&vec![0u8; MIN_ACCOUNT_DATA_LEN - 1]).is_err());
    }

    #[test]
    fn rejects_negative_reserves() {
        assert!(decode_reserves(&account_data(-1, 50_000_000)).is_err());
        assert!(decode_reserves(&account_data(100_000_000, i64::MIN)).is_err());
    }

    #[test]
    fn trailing_bytes_beyond_schema_are_ignored() {
        let mut data = account_data(7, 11);
        data.extend_from_slice(&[0xFF; 64]);
        let (reserve_a, reserve_b) = decode_reserves(&data).unwrap();
        assert_eq!(reserve_a, dec!(7));
        assert_eq!(reserve_b, dec!(11));
    }
}
