// src/feed/mod.rs
//
// Le modèle des transactions de swap telles que servies par l'API Helius,
// plus l'extraction de l'adresse du pool depuis les instructions.

pub mod helius;

use serde::Deserialize;

/// Le programme AMM Raydium v4. Seules les instructions de ce programme
/// peuvent désigner un pool que l'on suit.
pub const RAYDIUM_AMM_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Type de transaction traité; tout le reste est ignoré.
pub const SWAP_TYPE: &str = "SWAP";

// Layout des instructions de swap Raydium : le compte du pool est toujours
// en troisième position, et une instruction de swap en a au moins trois.
const POOL_ACCOUNT_INDEX: usize = 2;
const MIN_INSTRUCTION_ACCOUNTS: usize = 3;

/// Une transaction de swap observée via l'historique Helius. Les champs
/// inconnus du JSON sont simplement ignorés.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub signature: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub timestamp: Option<i64>,
    pub fee: Option<i64>,
    pub description: Option<String>,
    #[serde(default)]
    pub token_transfers: Vec<TokenTransfer>,
    #[serde(default)]
    pub instructions: Vec<InstructionData>,
}

/// Un mouvement de tokens au sein du swap. L'ordre est porteur de sens :
/// l'élément 0 est le côté entrant, l'élément 1 le côté sortant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default)]
    pub mint: String,
    pub token_amount: Option<f64>,
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub decimals: Option<u8>,
}

/// Une instruction de la transaction. `data` est du base58 opaque que l'on
/// ne décode jamais ici.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionData {
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub data: String,
}

impl SwapTransaction {
    pub fn is_swap(&self) -> bool {
        self.tx_type == SWAP_TYPE
    }

    /// Extrait l'adresse du pool : première instruction du programme Raydium
    /// avec au moins trois comptes, le pool est le compte d'index 2.
    /// `None` n'est pas une erreur, la transaction ne nous concerne pas.
    pub fn pool_address(&self) -> Option<&str> {
        self.instructions
            .iter()
            .find(|ix| {
                ix.program_id == RAYDIUM_AMM_PROGRAM_ID
                    && ix.accounts.len() >= MIN_INSTRUCTION_ACCOUNTS
            })
            .map(|ix| ix.accounts[POOL_ACCOUNT_INDEX].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction(program_id: &str, accounts: &[&str]) -> InstructionData {
        InstructionData {
            program_id: program_id.to_string(),
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            data: String::new(),
        }
    }

    fn swap_with_instructions(instructions: Vec<InstructionData>) -> SwapTransaction {
        SwapTransaction {
            signature: "sig".to_string(),
            tx_type: SWAP_TYPE.to_string(),
            timestamp: None,
            fee: None,
            description: None,
            token_transfers: Vec::new(),
            instructions,
        }
    }

    #[test]
    fn pool_address_is_third_account_of_first_raydium_instruction() {
        let tx = swap_with_instructions(vec![
            instruction("SomeOtherProgram", &["a", "b", "c", "d"]),
            instruction(RAYDIUM_AMM_PROGRAM_ID, &["a1", "a2", "PoolAddr1", "a4"]),
            instruction(RAYDIUM_AMM_PROGRAM_ID, &["b1", "b2", "PoolAddr2"]),
        ]);
        assert_eq!(tx.pool_address(), Some("PoolAddr1"));
    }

    #[test]
    fn pool_address_skips_raydium_instructions_with_too_few_accounts() {
        let tx = swap_with_instructions(vec![
            instruction(RAYDIUM_AMM_PROGRAM_ID, &["a1", "a2"]),
            instruction(RAYDIUM_AMM_PROGRAM_ID, &["b1", "b2", "PoolAddr"]),
        ]);
        assert_eq!(tx.pool_address(), Some("PoolAddr"));
    }

    #[test]
    fn pool_address_is_none_without_matching_instruction() {
        let tx = swap_with_instructions(vec![instruction("SomeOtherProgram", &["a", "b", "c"])]);
        assert_eq!(tx.pool_address(), None);

        let empty = swap_with_instructions(Vec::new());
        assert_eq!(empty.pool_address(), None);
    }

    #[test]
    fn deserializes_helius_payload() {
        let json = r#"{
            "signature": "5h4s",
            "type": "SWAP",
            "timestamp": 1700000000,
            "fee": 5000,
            "description": "swap 1 SOL for USDC",
            "somethingUnknown": {"nested": true},
            "tokenTransfers": [
                {"mint": "So11111111111111111111111111111111111111112",
                 "tokenAmount": 1.5,
                 "fromUserAccount": "from",
                 "toUserAccount": "to",
                 "decimals": 9}
            ],
            "instructions": [
                {"programId": "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8",
                 "accounts": ["x", "y", "pool"],
                 "data": "3Bxs"}
            ]
        }"#;
        let tx: SwapTransaction = serde_json::from_str(json).unwrap();
        assert!(tx.is_swap());
        assert_eq!(tx.signature, "5h4s");
        assert_eq!(tx.token_transfers[0].token_amount, Some(1.5));
        assert_eq!(tx.token_transfers[0].decimals, Some(9));
        assert_eq!(tx.pool_address(), Some("pool"));
    }
}
