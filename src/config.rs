use serde::Deserialize;
use anyhow::Result;

// Valeurs par défaut du rate limiter : le quota que le endpoint d'historique
// Helius tolère (7 requêtes par fenêtre de 10 secondes, timeout 500ms).
fn default_rate_limit_permits() -> u32 {
    7
}
fn default_rate_limit_window_secs() -> u64 {
    10
}
fn default_rate_limit_timeout_ms() -> u64 {
    500
}
fn default_worker_concurrency() -> usize {
    8
}
fn default_poll_interval_secs() -> u64 {
    30
}
fn default_rpc_max_retries() -> u8 {
    3
}
fn default_rpc_retry_delay_ms() -> u64 {
    500
}
fn default_metrics_port() -> u16 {
    9898
}
fn default_helius_api_base_url() -> String {
    "https://api.helius.xyz".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub solana_rpc_url: String,
    pub helius_api_key: String,
    #[serde(default = "default_helius_api_base_url")]
    pub helius_api_base_url: String,

    // --- Rate limiter (quota du fetch de comptes) ---
    #[serde(default = "default_rate_limit_permits")]
    pub rate_limit_permits: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_rate_limit_timeout_ms")]
    pub rate_limit_timeout_ms: u64,

    // --- Pool de workers ---
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    // --- Client RPC ---
    #[serde(default = "default_rpc_max_retries")]
    pub rpc_max_retries: u8,
    #[serde(default = "default_rpc_retry_delay_ms")]
    pub rpc_retry_delay_ms: u64,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()?;
        Ok(config)
    }
}
