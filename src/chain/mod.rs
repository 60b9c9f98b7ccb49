// Remote collaborators. Everything the core needs from the chain goes through
// these traits; `client::ChainClient` is the ethers-backed implementation and
// tests plug in in-memory ones.

pub mod client;
pub mod contracts;
pub mod providers;

use async_trait::async_trait;
use ethers::types::{Address, U256};

use crate::error::CoreResult;
use crate::models::{Pair, Pool, Position, TradeType};

pub use client::ChainClient;

/// Pool registry reads.
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn get_all_pools(&self) -> CoreResult<Vec<Pool>>;
    async fn get_pairs(&self) -> CoreResult<Vec<Pair>>;
}

/// Position registry reads.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn get_all_positions(&self) -> CoreResult<Vec<Position>>;
}

/// ERC-20 metadata and balance reads.
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn symbol(&self, token: Address) -> CoreResult<String>;
    async fn decimals(&self, token: Address) -> CoreResult<u8>;
    async fn balance_of(&self, token: Address, owner: Address) -> CoreResult<U256>;
}

/// Arguments for one simulated single-pool swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteParams {
    pub trade_type: TradeType,
    pub token_in: Address,
    pub token_out: Address,
    pub index_path: Vec<u32>,
    /// amountIn for ExactInput, amountOut for ExactOutput
    pub amount: U256,
    pub sqrt_price_limit_x96: U256,
}

/// Swap simulation. Returns amountOut for ExactInput and amountIn for ExactOutput.
#[async_trait]
pub trait Quoter: Send + Sync {
    async fn quote(&self, params: &QuoteParams) -> CoreResult<U256>;
}
