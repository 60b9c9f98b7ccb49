use std::env;

pub const DEFAULT_POOL_MANAGER: &str = "0xddC12b3F9F7C91C79DA7433D8d212FB78d609f7B";
pub const DEFAULT_POSITION_MANAGER: &str = "0xbe766Bf20eFfe431829C5d5a2744865974A0B610";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub port: u16,

    // Protocol addresses
    pub pool_manager_address: String,
    pub position_manager_address: String,
    pub swap_router_address: String,

    pub native_symbol: String,

    // Quoting
    pub quote_debounce_ms: u64,
    pub slippage_bps: u32,
    pub swap_deadline_secs: u64,
}

fn var_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Secrets first, then public addresses
        dotenv::from_filename("secrets.env").ok();
        dotenv::from_filename("config/addresses.env").ok();
        dotenv::dotenv().ok();

        Ok(Config {
            rpc_url: env::var("RPC_URL").map_err(|_| "RPC_URL must be set")?,
            port: var_or("PORT", 8000),

            pool_manager_address: env::var("POOL_MANAGER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_POOL_MANAGER.to_string()),
            position_manager_address: env::var("POSITION_MANAGER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_POSITION_MANAGER.to_string()),
            swap_router_address: env::var("SWAP_ROUTER_ADDRESS")
                .map_err(|_| "SWAP_ROUTER_ADDRESS must be set")?,

            native_symbol: env::var("NATIVE_SYMBOL").unwrap_or_else(|_| "ETH".to_string()),

            quote_debounce_ms: var_or("QUOTE_DEBOUNCE_MS", 300),
            slippage_bps: var_or("SLIPPAGE_BPS", 50),
            swap_deadline_secs: var_or("SWAP_DEADLINE_SECS", 600),
        })
    }
}
