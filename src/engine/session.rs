use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::chain::{PoolSource, PositionSource, Quoter, TokenReader};
use crate::engine::pool_index::{build_pool_views, PoolIndex, PoolView};
use crate::engine::positions::{PositionBook, PositionResolver, PositionView};
use crate::engine::quote::{QuoteEngine, QuoteSettings};
use crate::engine::tokens::TokenMetadataCache;

/// Everything the core keeps in memory for one connected wallet on one network.
///
/// A network switch builds a new `Session`; an account switch goes through
/// [`Session::switch_account`].
pub struct Session {
    pub tokens: Arc<TokenMetadataCache>,
    pub pools: Arc<PoolIndex>,
    pub positions: Arc<PositionBook>,
    pub resolver: PositionResolver,
    pub quotes: Arc<QuoteEngine>,
    account: RwLock<Option<Address>>,
}

/// Remote collaborators a session is built on.
#[derive(Clone)]
pub struct Collaborators {
    pub pool_source: Arc<dyn PoolSource>,
    pub position_source: Arc<dyn PositionSource>,
    pub token_reader: Arc<dyn TokenReader>,
    pub quoter: Arc<dyn Quoter>,
}

impl Session {
    pub fn new(collaborators: Collaborators, native_symbol: &str, settings: QuoteSettings) -> Self {
        let tokens = Arc::new(TokenMetadataCache::new(collaborators.token_reader, native_symbol));
        let pools = Arc::new(PoolIndex::new(collaborators.pool_source));
        let positions = Arc::new(PositionBook::new(collaborators.position_source));
        let resolver = PositionResolver::new(pools.clone(), tokens.clone());
        let quotes = Arc::new(QuoteEngine::new(pools.clone(), tokens.clone(), collaborators.quoter, settings));
        Self {
            tokens,
            pools,
            positions,
            resolver,
            quotes,
            account: RwLock::new(None),
        }
    }

    pub async fn account(&self) -> Option<Address> {
        *self.account.read().await
    }

    /// Drops the previous owner's balances and any quote in flight.
    pub async fn switch_account(&self, account: Option<Address>) {
        let previous = std::mem::replace(&mut *self.account.write().await, account);
        if previous == account {
            return;
        }
        if let Some(old) = previous {
            self.tokens.clear_balances_for(old).await;
        }
        self.quotes.reset().await;
        log::info!("account switched: {:?} -> {:?}", previous, account);
    }

    /// Pool table, reloading the pool set first.
    pub async fn pool_table(&self) -> Vec<PoolView> {
        if let Err(e) = self.pools.refresh().await {
            log::warn!("pool refresh failed, serving last snapshot: {}", e);
        }
        let pools = self.pools.pools().await;
        build_pool_views(&pools, &self.tokens).await
    }

    /// Position table for `owner`, or for the connected account when `None`.
    pub async fn position_table(&self, owner: Option<Address>) -> Vec<PositionView> {
        let owner = match owner {
            Some(o) => Some(o),
            None => self.account().await,
        };
        if owner.is_none() {
            return Vec::new();
        }
        if let Err(e) = self.positions.refresh().await {
            log::warn!("position refresh failed, serving last snapshot: {}", e);
        }
        let positions = self.positions.positions().await;
        self.resolver.resolve_for_owner(&positions, owner).await
    }
}
