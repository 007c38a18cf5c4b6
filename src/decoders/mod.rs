pub mod raydium_pool;

pub use raydium_pool::decode_reserves;
