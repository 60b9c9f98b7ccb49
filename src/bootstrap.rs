use anyhow::{anyhow, Context};
use ethers::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::{providers, ChainClient};
use crate::config::Config;
use crate::engine::{Collaborators, QuoteSettings, Session};
use crate::math::parse_address;

pub struct AppState {
    pub provider: Arc<Provider<Http>>,
    pub pool_manager: Address,
    pub position_manager: Address,
    pub swap_router: Address,
    pub session: Session,
}

fn address(name: &str, value: &str) -> anyhow::Result<Address> {
    parse_address(value).with_context(|| format!("{} is not a valid address", name))
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let provider = providers::create_provider(&config.rpc_url)
            .map_err(|e| anyhow!("cannot create provider for {}: {}", config.rpc_url, e))?;
        let pool_manager = address("POOL_MANAGER_ADDRESS", &config.pool_manager_address)?;
        let position_manager = address("POSITION_MANAGER_ADDRESS", &config.position_manager_address)?;
        let swap_router = address("SWAP_ROUTER_ADDRESS", &config.swap_router_address)?;

        let client = Arc::new(ChainClient::new(provider.clone(), pool_manager, position_manager, swap_router));
        let collaborators = Collaborators {
            pool_source: client.clone(),
            position_source: client.clone(),
            token_reader: client.clone(),
            quoter: client,
        };
        let settings = QuoteSettings {
            debounce: Duration::from_millis(config.quote_debounce_ms),
            slippage_bps: config.slippage_bps,
            deadline_secs: config.swap_deadline_secs,
        };

        Ok(AppState {
            provider,
            pool_manager,
            position_manager,
            swap_router,
            session: Session::new(collaborators, &config.native_symbol, settings),
        })
    }
}
