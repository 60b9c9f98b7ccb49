// tests/common/mod.rs
// ===================================
// In-memory chain collaborators with call counters, injectable failures and delays.
#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simpleswap_core::chain::{PoolSource, PositionSource, QuoteParams, Quoter, TokenReader};
use simpleswap_core::engine::{Collaborators, QuoteSettings, Session};
use simpleswap_core::models::{Pair, Pool, Position};
use simpleswap_core::{CoreError, CoreResult};

pub fn addr(byte: u8) -> Address {
    Address::from([byte; 20])
}

pub fn pool(token0: Address, token1: Address, index: u32, fee: u32) -> Pool {
    Pool {
        pool: Address::from_low_u64_be(0x1000 + index as u64),
        token0,
        token1,
        index,
        fee,
        fee_protocol: 0,
        tick_lower: -600,
        tick_upper: 600,
        tick: 0,
        sqrt_price_x96: U256::one() << 96,
        liquidity: 1_000_000,
    }
}

pub fn position(id: u64, owner: Address, pool: &Pool) -> Position {
    Position {
        id: U256::from(id),
        owner,
        token0: pool.token0,
        token1: pool.token1,
        index: pool.index,
        fee: pool.fee,
        liquidity: 5_000,
        tick_lower: -120,
        tick_upper: 120,
        tokens_owed0: 0,
        tokens_owed1: 0,
        fee_growth_inside0_last_x128: U256::zero(),
        fee_growth_inside1_last_x128: U256::zero(),
    }
}

/// How the mock answers one quote call.
#[derive(Clone, Debug)]
pub struct QuoteScript {
    pub result: CoreResult<U256>,
    pub delay: Duration,
}

impl QuoteScript {
    pub fn ok(v: u64) -> Self {
        Self { result: Ok(U256::from(v)), delay: Duration::ZERO }
    }

    pub fn fail() -> Self {
        Self { result: Err(CoreError::remote("execution reverted")), delay: Duration::ZERO }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type QuoteFn = Box<dyn Fn(&QuoteParams) -> QuoteScript + Send>;

pub struct MockChain {
    pub pools: Mutex<Vec<Pool>>,
    pub pairs: Mutex<Vec<Pair>>,
    pub positions: Mutex<Vec<Position>>,
    pub symbols: Mutex<HashMap<Address, String>>, // missing -> remote failure
    pub decimals: Mutex<HashMap<Address, u8>>,    // missing -> remote failure
    pub balances: Mutex<HashMap<(Address, Address), U256>>,
    pub fail_pools: AtomicBool,
    quote_fn: Mutex<QuoteFn>,

    pub pool_calls: AtomicUsize,
    pub pair_calls: AtomicUsize,
    pub position_calls: AtomicUsize,
    pub symbol_calls: AtomicUsize,
    pub decimals_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub quote_calls: AtomicUsize,
    pub quote_log: Mutex<Vec<QuoteParams>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(Vec::new()),
            pairs: Mutex::new(Vec::new()),
            positions: Mutex::new(Vec::new()),
            symbols: Mutex::new(HashMap::new()),
            decimals: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            fail_pools: AtomicBool::new(false),
            quote_fn: Mutex::new(Box::new(|_| QuoteScript::fail())),
            pool_calls: AtomicUsize::new(0),
            pair_calls: AtomicUsize::new(0),
            position_calls: AtomicUsize::new(0),
            symbol_calls: AtomicUsize::new(0),
            decimals_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            quote_calls: AtomicUsize::new(0),
            quote_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pools(self, pools: Vec<Pool>) -> Self {
        *self.pools.lock().unwrap() = pools;
        self
    }

    pub fn with_symbol(self, token: Address, symbol: &str) -> Self {
        self.symbols.lock().unwrap().insert(token, symbol.to_string());
        self
    }

    pub fn with_decimals(self, token: Address, decimals: u8) -> Self {
        self.decimals.lock().unwrap().insert(token, decimals);
        self
    }

    pub fn with_quotes(self, f: impl Fn(&QuoteParams) -> QuoteScript + Send + 'static) -> Self {
        *self.quote_fn.lock().unwrap() = Box::new(f);
        self
    }

    /// Quotes scripted per pool index; unknown indexes fail.
    pub fn with_pool_quotes(self, scripts: Vec<(u32, QuoteScript)>) -> Self {
        let map: HashMap<u32, QuoteScript> = scripts.into_iter().collect();
        self.with_quotes(move |p| map.get(&p.index_path[0]).cloned().unwrap_or_else(QuoteScript::fail))
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolSource for MockChain {
    async fn get_all_pools(&self) -> CoreResult<Vec<Pool>> {
        self.pool_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pools.load(Ordering::SeqCst) {
            return Err(CoreError::remote("rpc unavailable"));
        }
        Ok(self.pools.lock().unwrap().clone())
    }

    async fn get_pairs(&self) -> CoreResult<Vec<Pair>> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pairs.lock().unwrap().clone())
    }
}

#[async_trait]
impl PositionSource for MockChain {
    async fn get_all_positions(&self) -> CoreResult<Vec<Position>> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.positions.lock().unwrap().clone())
    }
}

#[async_trait]
impl TokenReader for MockChain {
    async fn symbol(&self, token: Address) -> CoreResult<String> {
        self.symbol_calls.fetch_add(1, Ordering::SeqCst);
        self.symbols
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(|| CoreError::remote("symbol() reverted"))
    }

    async fn decimals(&self, token: Address) -> CoreResult<u8> {
        self.decimals_calls.fetch_add(1, Ordering::SeqCst);
        self.decimals
            .lock()
            .unwrap()
            .get(&token)
            .copied()
            .ok_or_else(|| CoreError::remote("decimals() reverted"))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> CoreResult<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances
            .lock()
            .unwrap()
            .get(&(token, owner))
            .copied()
            .ok_or_else(|| CoreError::remote("balanceOf() reverted"))
    }
}

#[async_trait]
impl Quoter for MockChain {
    async fn quote(&self, params: &QuoteParams) -> CoreResult<U256> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quote_log.lock().unwrap().push(params.clone());
        let script = {
            let f = self.quote_fn.lock().unwrap();
            (*f)(params)
        };
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        script.result
    }
}

pub fn collaborators(chain: &Arc<MockChain>) -> Collaborators {
    Collaborators {
        pool_source: chain.clone(),
        position_source: chain.clone(),
        token_reader: chain.clone(),
        quoter: chain.clone(),
    }
}

pub fn session(chain: &Arc<MockChain>, settings: QuoteSettings) -> Session {
    Session::new(collaborators(chain), "ETH", settings)
}

pub fn fast_settings() -> QuoteSettings {
    QuoteSettings {
        debounce: Duration::from_millis(20),
        slippage_bps: 50,
        deadline_secs: 600,
    }
}
