use async_trait::async_trait;
use ethers::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use crate::chain::contracts::{
    pair_from_info, pool_from_info, position_from_info, PoolManager, PositionManager, QuoteArgs,
    SwapRouter, ERC20,
};
use crate::chain::{PoolSource, PositionSource, QuoteParams, Quoter, TokenReader};
use crate::error::{CoreError, CoreResult};
use crate::models::{Pair, Pool, Position, TradeType};

/// ethers-backed implementation of every remote read the core makes.
/// All calls are `eth_call`s against the latest block.
pub struct ChainClient<M> {
    client: Arc<M>,
    pool_manager: PoolManager<M>,
    position_manager: PositionManager<M>,
    swap_router: SwapRouter<M>,
}

fn remote<E: std::fmt::Display>(what: &str, at: Address) -> impl FnOnce(E) -> CoreError + '_ {
    move |e| CoreError::remote(format!("{} on {:?}: {}", what, at, e))
}

impl<M: Middleware + 'static> ChainClient<M> {
    pub fn new(client: Arc<M>, pool_manager: Address, position_manager: Address, swap_router: Address) -> Self {
        Self {
            pool_manager: PoolManager::new(pool_manager, client.clone()),
            position_manager: PositionManager::new(position_manager, client.clone()),
            swap_router: SwapRouter::new(swap_router, client.clone()),
            client,
        }
    }

    fn erc20(&self, token: Address) -> ERC20<M> {
        ERC20::new(token, self.client.clone())
    }
}

#[async_trait]
impl<M: Middleware + 'static> PoolSource for ChainClient<M> {
    async fn get_all_pools(&self) -> CoreResult<Vec<Pool>> {
        let start = Instant::now();
        let at = self.pool_manager.address();
        let infos = self
            .pool_manager
            .get_all_pools()
            .call()
            .await
            .map_err(remote("getAllPools", at))?;
        let pools = infos.into_iter().map(pool_from_info).collect::<CoreResult<Vec<_>>>()?;
        log::debug!("loaded {} pools in {:?}", pools.len(), start.elapsed());
        Ok(pools)
    }

    async fn get_pairs(&self) -> CoreResult<Vec<Pair>> {
        let at = self.pool_manager.address();
        let infos = self.pool_manager.get_pairs().call().await.map_err(remote("getPairs", at))?;
        Ok(infos.into_iter().map(pair_from_info).collect())
    }
}

#[async_trait]
impl<M: Middleware + 'static> PositionSource for ChainClient<M> {
    async fn get_all_positions(&self) -> CoreResult<Vec<Position>> {
        let start = Instant::now();
        let at = self.position_manager.address();
        let infos = self
            .position_manager
            .get_all_positions()
            .call()
            .await
            .map_err(remote("getAllPositions", at))?;
        log::debug!("loaded {} positions in {:?}", infos.len(), start.elapsed());
        Ok(infos.into_iter().map(position_from_info).collect())
    }
}

#[async_trait]
impl<M: Middleware + 'static> TokenReader for ChainClient<M> {
    async fn symbol(&self, token: Address) -> CoreResult<String> {
        self.erc20(token).symbol().call().await.map_err(remote("symbol", token))
    }

    async fn decimals(&self, token: Address) -> CoreResult<u8> {
        self.erc20(token).decimals().call().await.map_err(remote("decimals", token))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> CoreResult<U256> {
        self.erc20(token)
            .balance_of(owner)
            .call()
            .await
            .map_err(remote("balanceOf", token))
    }
}

#[async_trait]
impl<M: Middleware + 'static> Quoter for ChainClient<M> {
    async fn quote(&self, params: &QuoteParams) -> CoreResult<U256> {
        let start = Instant::now();
        let at = self.swap_router.address();
        let args: QuoteArgs = (
            params.token_in,
            params.token_out,
            params.index_path.clone(),
            params.amount,
            params.sqrt_price_limit_x96,
        );
        let (name, result) = match params.trade_type {
            TradeType::ExactInput => ("quoteExactInput", self.swap_router.quote_exact_input(args).call().await),
            TradeType::ExactOutput => ("quoteExactOutput", self.swap_router.quote_exact_output(args).call().await),
        };
        let amount = result.map_err(remote(name, at))?;
        log::debug!("{} via {:?} completed in {:?}", name, params.index_path, start.elapsed());
        Ok(amount)
    }
}
