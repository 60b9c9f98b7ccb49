use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::chain::PoolSource;
use crate::engine::tokens::TokenMetadataCache;
use crate::error::CoreResult;
use crate::math::{format_fee_tier, format_price_for_ui, format_price_range, parse_address};
use crate::models::{Pair, Pool};

/// Orders a pair so the smaller address is token0.
///
/// `Address` compares its raw bytes, which is the same order as comparing
/// lowercase hex, so checksummed and lowercase inputs canonicalize alike.
pub fn canonicalize_pair(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a <= token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// String form of [`canonicalize_pair`]; rejects malformed addresses.
pub fn canonicalize_pair_str(token_a: &str, token_b: &str) -> CoreResult<(Address, Address)> {
    Ok(canonicalize_pair(parse_address(token_a)?, parse_address(token_b)?))
}

/// The loaded pool set plus the refresh-once lookup policy.
///
/// The set is an immutable snapshot swapped wholesale on refresh; readers
/// holding an older `Arc` keep a consistent view.
pub struct PoolIndex {
    source: Arc<dyn PoolSource>,
    pools: RwLock<Arc<Vec<Pool>>>,
    pairs: RwLock<Arc<Vec<Pair>>>,
}

impl PoolIndex {
    pub fn new(source: Arc<dyn PoolSource>) -> Self {
        Self {
            source,
            pools: RwLock::new(Arc::new(Vec::new())),
            pairs: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Reloads every pool from the pool manager.
    pub async fn refresh(&self) -> CoreResult<usize> {
        let fresh = self.source.get_all_pools().await?;
        let count = fresh.len();
        *self.pools.write().await = Arc::new(fresh);
        log::debug!("pool index refreshed: {} pools", count);
        Ok(count)
    }

    /// Current snapshot without touching the network.
    pub async fn pools(&self) -> Arc<Vec<Pool>> {
        self.pools.read().await.clone()
    }

    async fn refresh_quietly(&self) {
        if let Err(e) = self.refresh().await {
            log::warn!("pool refresh failed: {}", e);
        }
    }

    fn search(pools: &[Pool], token0: Address, token1: Address, index: u32) -> Option<Pool> {
        pools
            .iter()
            .find(|p| p.matches_pair(token0, token1) && p.index == index)
            .cloned()
    }

    fn search_pair(pools: &[Pool], token0: Address, token1: Address) -> Vec<Pool> {
        pools.iter().filter(|p| p.matches_pair(token0, token1)).cloned().collect()
    }

    /// Exact (token0, token1, index) match. One refresh on a miss, then one retry.
    pub async fn find_pool(&self, token_a: Address, token_b: Address, index: u32) -> Option<Pool> {
        let (token0, token1) = canonicalize_pair(token_a, token_b);
        if let Some(hit) = Self::search(&self.pools().await, token0, token1, index) {
            return Some(hit);
        }
        log::debug!("pool {:?}/{:?}#{} not loaded, refreshing", token0, token1, index);
        self.refresh_quietly().await;
        Self::search(&self.pools().await, token0, token1, index)
    }

    /// Every pool for the pair, any fee tier or index. Same refresh-once policy.
    pub async fn find_pools_by_tokens(&self, token_a: Address, token_b: Address) -> Vec<Pool> {
        let (token0, token1) = canonicalize_pair(token_a, token_b);
        let found = Self::search_pair(&self.pools().await, token0, token1);
        if !found.is_empty() {
            return found;
        }
        self.refresh_quietly().await;
        Self::search_pair(&self.pools().await, token0, token1)
    }

    /// Loaded set only. Accepts the tokens in either order.
    pub async fn find_pool_by_fee_tier(&self, token_a: Address, token_b: Address, fee: u32) -> Option<Pool> {
        self.pools()
            .await
            .iter()
            .find(|p| {
                p.fee == fee
                    && ((p.token0 == token_a && p.token1 == token_b)
                        || (p.token0 == token_b && p.token1 == token_a))
            })
            .cloned()
    }

    /// Loaded set only.
    pub async fn find_pool_by_address(&self, pool: Address) -> Option<Pool> {
        self.pools().await.iter().find(|p| p.pool == pool).cloned()
    }

    /// Pairs known to the pool manager, fetched on first use.
    pub async fn pairs(&self) -> CoreResult<Arc<Vec<Pair>>> {
        let cached = self.pairs.read().await.clone();
        if !cached.is_empty() {
            return Ok(cached);
        }
        self.refresh_pairs().await
    }

    pub async fn refresh_pairs(&self) -> CoreResult<Arc<Vec<Pair>>> {
        let fresh = Arc::new(self.source.get_pairs().await?);
        *self.pairs.write().await = fresh.clone();
        Ok(fresh)
    }

    /// Unique tokens across all pairs, in address order.
    pub async fn token_list(&self) -> CoreResult<Vec<Address>> {
        let pairs = self.pairs().await?;
        let unique: BTreeSet<Address> = pairs.iter().flat_map(|p| [p.token0, p.token1]).collect();
        Ok(unique.into_iter().collect())
    }
}

/// One row of the pool table.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolView {
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub index: u32,
    pub token: String,
    pub fee_tier: String,
    pub price_range: String,
    pub current_price: String,
    pub current_price_decimal: BigDecimal,
    pub liquidity: u128,
    pub reserve0: U256,
    pub reserve1: U256,
}

async fn pool_view(pool: &Pool, tokens: &TokenMetadataCache) -> PoolView {
    let (symbol0, symbol1, reserve0, reserve1) = futures::join!(
        tokens.symbol_of(pool.token0),
        tokens.symbol_of(pool.token1),
        tokens.get_balance(pool.token0, pool.pool),
        tokens.get_balance(pool.token1, pool.pool),
    );
    let price = pool.current_price();
    let price_range = format_price_range(pool.tick_lower, pool.tick_upper).unwrap_or_else(|e| {
        log::warn!("bad tick range on pool {:?}: {}", pool.pool, e);
        "-".to_string()
    });
    PoolView {
        pool: pool.pool,
        token0: pool.token0,
        token1: pool.token1,
        index: pool.index,
        token: format!("{} / {}", symbol0, symbol1),
        fee_tier: format_fee_tier(pool.fee),
        price_range,
        current_price: format_price_for_ui(&price),
        current_price_decimal: price,
        liquidity: pool.liquidity,
        reserve0,
        reserve1,
    }
}

/// Table rows for the loaded pools, in index order.
pub async fn build_pool_views(pools: &[Pool], tokens: &TokenMetadataCache) -> Vec<PoolView> {
    join_all(pools.iter().map(|p| pool_view(p, tokens))).await
}
