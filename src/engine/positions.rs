use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::chain::PositionSource;
use crate::engine::pool_index::{canonicalize_pair, PoolIndex};
use crate::engine::tokens::TokenMetadataCache;
use crate::error::CoreResult;
use crate::math::{format_fee_tier, format_price_for_ui, format_price_range};
use crate::models::{Pool, Position};

/// Loaded position set from the position manager.
pub struct PositionBook {
    source: Arc<dyn PositionSource>,
    positions: RwLock<Arc<Vec<Position>>>,
}

impl PositionBook {
    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self {
            source,
            positions: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub async fn refresh(&self) -> CoreResult<usize> {
        let fresh = self.source.get_all_positions().await?;
        let count = fresh.len();
        *self.positions.write().await = Arc::new(fresh);
        log::debug!("position book refreshed: {} positions", count);
        Ok(count)
    }

    pub async fn positions(&self) -> Arc<Vec<Position>> {
        self.positions.read().await.clone()
    }

    /// Loaded set first; one refresh on a miss.
    pub async fn get_position_by_id(&self, id: U256) -> Option<Position> {
        if let Some(p) = self.positions().await.iter().find(|p| p.id == id) {
            return Some(p.clone());
        }
        if let Err(e) = self.refresh().await {
            log::warn!("position refresh failed: {}", e);
            return None;
        }
        self.positions().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn get_positions_by_owner(&self, owner: Address) -> Vec<Position> {
        self.positions().await.iter().filter(|p| p.owner == owner).cloned().collect()
    }
}

/// One row of the positions table.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub id: U256,
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub index: u32,
    pub token: String,
    pub fee_tier: String,
    pub price_range: String,
    pub current_price: String,
    pub current_price_decimal: BigDecimal,
    pub in_range: bool,
    pub liquidity: u128,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

/// Joins positions to their pools and renders display rows.
pub struct PositionResolver {
    index: Arc<PoolIndex>,
    tokens: Arc<TokenMetadataCache>,
}

impl PositionResolver {
    pub fn new(index: Arc<PoolIndex>, tokens: Arc<TokenMetadataCache>) -> Self {
        Self { index, tokens }
    }

    fn lookup(pools: &[Pool], position: &Position) -> Option<Pool> {
        let (token0, token1) = canonicalize_pair(position.token0, position.token1);
        pools
            .iter()
            .find(|p| p.matches_pair(token0, token1) && p.index == position.index)
            .cloned()
    }

    /// Rows for `owner`'s open positions. No owner (disconnected wallet)
    /// yields no rows. Positions whose pool is still missing after one
    /// refresh are dropped.
    pub async fn resolve_for_owner(&self, positions: &[Position], owner: Option<Address>) -> Vec<PositionView> {
        let owner = match owner {
            Some(o) => o,
            None => return Vec::new(),
        };
        let mine: Vec<&Position> = positions
            .iter()
            .filter(|p| p.owner == owner && !p.is_closed())
            .collect();
        if mine.is_empty() {
            return Vec::new();
        }

        let mut pools = self.index.pools().await;
        if mine.iter().any(|p| Self::lookup(&pools, p).is_none()) {
            log::debug!("unresolved positions for {:?}, refreshing pools", owner);
            if let Err(e) = self.index.refresh().await {
                log::warn!("pool refresh failed: {}", e);
            }
            pools = self.index.pools().await;
        }

        let mut views = Vec::with_capacity(mine.len());
        for position in mine {
            match Self::lookup(&pools, position) {
                Some(pool) => views.push(self.view(position, &pool).await),
                None => log::debug!("dropping position {} with no pool", position.id),
            }
        }
        views
    }

    async fn view(&self, position: &Position, pool: &Pool) -> PositionView {
        let symbol0 = self.tokens.symbol_of(position.token0).await;
        let symbol1 = self.tokens.symbol_of(position.token1).await;
        let price = pool.current_price();
        let price_range = format_price_range(position.tick_lower, position.tick_upper)
            .unwrap_or_else(|_| "-".to_string());
        PositionView {
            id: position.id,
            pool: pool.pool,
            token0: position.token0,
            token1: position.token1,
            index: position.index,
            token: format!("{} / {}", symbol0, symbol1),
            fee_tier: format_fee_tier(position.fee),
            price_range,
            current_price: format_price_for_ui(&price),
            current_price_decimal: price,
            in_range: position.tick_lower <= pool.tick && pool.tick < position.tick_upper,
            liquidity: position.liquidity,
            tokens_owed0: position.tokens_owed0,
            tokens_owed1: position.tokens_owed1,
        }
    }
}
