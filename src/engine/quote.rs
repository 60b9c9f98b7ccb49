use chrono::Utc;
use ethers::types::{Address, U256};
use futures::future::join_all;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::chain::{QuoteParams, Quoter};
use crate::engine::pool_index::PoolIndex;
use crate::engine::tokens::TokenMetadataCache;
use crate::error::{CoreError, CoreResult};
use crate::math::{default_sqrt_price_limit, format_units, parse_units};
use crate::models::{Pool, TradeType};

const BPS: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct QuoteSettings {
    pub debounce: Duration,
    pub slippage_bps: u32,
    pub deadline_secs: u64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            slippage_bps: 50,
            deadline_secs: 600,
        }
    }
}

/// What the user typed. `amount` is the authoritative side: token_in for
/// ExactInput, token_out for ExactOutput, in human units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount: String,
    pub trade_type: TradeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteFailure {
    #[error("{0}")]
    Invalid(CoreError),
    #[error("no pool for this pair")]
    NoPool,
    #[error("every pool failed to quote")]
    AllQuotesFailed,
}

/// One candidate's outcome. Failures stay in the set and always rank last.
#[derive(Debug, Clone)]
pub struct PoolQuote {
    pub pool: Pool,
    pub result: CoreResult<U256>,
}

/// Value that always loses the comparison for this direction.
pub fn failure_sentinel(trade_type: TradeType) -> U256 {
    match trade_type {
        TradeType::ExactInput => U256::zero(),
        TradeType::ExactOutput => U256::MAX,
    }
}

impl PoolQuote {
    pub fn value(&self, trade_type: TradeType) -> U256 {
        match &self.result {
            Ok(v) => *v,
            Err(_) => failure_sentinel(trade_type),
        }
    }
}

/// Max output for ExactInput, min input for ExactOutput; ties go to the lower
/// pool index. A failed pool ranks below every successful one, even a
/// successful zero. `None` only for an empty set.
pub fn select_best(trade_type: TradeType, candidates: &[PoolQuote]) -> Option<&PoolQuote> {
    match trade_type {
        TradeType::ExactInput => candidates
            .iter()
            .max_by_key(|c| (c.result.is_ok(), c.value(trade_type), Reverse(c.pool.index))),
        TradeType::ExactOutput => candidates
            .iter()
            .min_by_key(|c| (c.result.is_err(), c.value(trade_type), c.pool.index)),
    }
}

/// A settled best quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub pool: Pool,
    pub trade_type: TradeType,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    /// Engine-computed amount for the non-authoritative side, human units.
    pub counterpart: String,
    pub candidates: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuotePhase {
    Idle,
    Debouncing,
    Quoting,
    Settled(Result<Quote, QuoteFailure>),
}

/// Parameters for `exactInput` / `exactOutput` on the swap router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    pub trade_type: TradeType,
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub index_path: Vec<u32>,
    pub amount_in: U256,
    pub amount_out: U256,
    /// amountOutMinimum for ExactInput, amountInMaximum for ExactOutput.
    pub amount_limit: U256,
    pub sqrt_price_limit_x96: U256,
    pub deadline: u64,
}

/// Debounced best-pool quoting with stale-result suppression.
///
/// Every `submit` bumps a generation counter and aborts the pending task.
/// A task only publishes if its generation is still current, so a slow
/// earlier response can never overwrite a later one.
pub struct QuoteEngine {
    index: Arc<PoolIndex>,
    tokens: Arc<TokenMetadataCache>,
    quoter: Arc<dyn Quoter>,
    settings: QuoteSettings,
    generation: AtomicU64,
    phase: watch::Sender<QuotePhase>,
    pending: Mutex<Option<JoinHandle<()>>>,
    best: RwLock<Option<Quote>>,
}

impl QuoteEngine {
    pub fn new(
        index: Arc<PoolIndex>,
        tokens: Arc<TokenMetadataCache>,
        quoter: Arc<dyn Quoter>,
        settings: QuoteSettings,
    ) -> Self {
        let (phase, _) = watch::channel(QuotePhase::Idle);
        Self {
            index,
            tokens,
            quoter,
            settings,
            generation: AtomicU64::new(0),
            phase,
            pending: Mutex::new(None),
            best: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &QuoteSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<QuotePhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> QuotePhase {
        self.phase.borrow().clone()
    }

    /// Retained winner of the last settled quote.
    pub async fn best_quote(&self) -> Option<Quote> {
        self.best.read().await.clone()
    }

    /// Restarts the machine from Debouncing. Returns the request's generation.
    pub async fn submit(self: &Arc<Self>, request: QuoteRequest) -> u64 {
        // the generation only moves while the pending guard is held
        let mut pending = self.pending.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *self.best.write().await = None;
        self.phase.send_replace(QuotePhase::Debouncing);

        let engine = Arc::clone(self);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(engine.settings.debounce).await;
            if !engine.is_current(generation) {
                return;
            }
            engine.phase.send_replace(QuotePhase::Quoting);
            let outcome = engine.quote_best(&request).await;
            engine.publish(generation, outcome).await;
        }));
        generation
    }

    /// Back to Idle, dropping any pending work and the retained quote.
    pub async fn reset(&self) {
        let mut pending = self.pending.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *self.best.write().await = None;
        self.phase.send_replace(QuotePhase::Idle);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn publish(&self, generation: u64, outcome: Result<Quote, QuoteFailure>) {
        let mut best = self.best.write().await;
        if !self.is_current(generation) {
            log::warn!("discarding stale quote from generation {}", generation);
            return;
        }
        *best = outcome.as_ref().ok().cloned();
        self.phase.send_replace(QuotePhase::Settled(outcome));
    }

    /// One undebounced quote cycle: validate, enumerate, fan out, select.
    pub async fn quote_best(&self, request: &QuoteRequest) -> Result<Quote, QuoteFailure> {
        if request.token_in == request.token_out {
            return Err(QuoteFailure::Invalid(CoreError::invalid("token_in and token_out are the same")));
        }
        let (fixed_token, solved_token) = match request.trade_type {
            TradeType::ExactInput => (request.token_in, request.token_out),
            TradeType::ExactOutput => (request.token_out, request.token_in),
        };
        let fixed_decimals = self.tokens.get_decimals(fixed_token).await;
        let amount = parse_units(&request.amount, fixed_decimals).map_err(QuoteFailure::Invalid)?;
        if amount.is_zero() {
            return Err(QuoteFailure::Invalid(CoreError::invalid("amount must be greater than zero")));
        }

        let pools = self.index.find_pools_by_tokens(request.token_in, request.token_out).await;
        if pools.is_empty() {
            log::debug!("no pool for {:?} -> {:?}", request.token_in, request.token_out);
            return Err(QuoteFailure::NoPool);
        }

        let zero_for_one = request.token_in < request.token_out;
        let limit = default_sqrt_price_limit(zero_for_one);
        let candidates = join_all(pools.into_iter().map(|pool| {
            let params = QuoteParams {
                trade_type: request.trade_type,
                token_in: request.token_in,
                token_out: request.token_out,
                index_path: vec![pool.index],
                amount,
                sqrt_price_limit_x96: limit,
            };
            async move {
                let result = self.quoter.quote(&params).await;
                match &result {
                    Ok(v) => log::debug!("pool #{} quoted {}", pool.index, v),
                    Err(e) => log::warn!("pool #{} failed to quote: {}", pool.index, e),
                }
                PoolQuote { pool, result }
            }
        }))
        .await;

        let winner = match select_best(request.trade_type, &candidates) {
            Some(w) if w.result.is_ok() => w,
            _ => return Err(QuoteFailure::AllQuotesFailed),
        };
        let solved = winner.value(request.trade_type);
        let solved_decimals = self.tokens.get_decimals(solved_token).await;
        let (amount_in, amount_out) = match request.trade_type {
            TradeType::ExactInput => (amount, solved),
            TradeType::ExactOutput => (solved, amount),
        };

        Ok(Quote {
            pool: winner.pool.clone(),
            trade_type: request.trade_type,
            token_in: request.token_in,
            token_out: request.token_out,
            amount_in,
            amount_out,
            counterpart: format_units(solved, solved_decimals),
            candidates: candidates.len(),
        })
    }

    /// Builds router parameters from the retained best quote after checking
    /// it still matches what the user is about to submit.
    pub async fn prepare_swap(&self, token_in: Address, token_out: Address, trade_type: TradeType) -> CoreResult<SwapPlan> {
        let quote = self
            .best_quote()
            .await
            .ok_or_else(|| CoreError::NotFound("no settled quote".into()))?;
        if quote.token_in != token_in || quote.token_out != token_out || quote.trade_type != trade_type {
            return Err(CoreError::invalid("quote no longer matches the selected pair or direction"));
        }
        if self.index.find_pool_by_address(quote.pool.pool).await.is_none() {
            return Err(CoreError::NotFound(format!("pool {:?} is no longer indexed", quote.pool.pool)));
        }

        let slippage = U256::from(self.settings.slippage_bps.min(BPS));
        let amount_limit = match trade_type {
            TradeType::ExactInput => quote
                .amount_out
                .checked_mul(U256::from(BPS) - slippage)
                .map(|v| v / U256::from(BPS))
                .ok_or_else(|| CoreError::Overflow("amountOutMinimum".into()))?,
            TradeType::ExactOutput => quote
                .amount_in
                .checked_mul(U256::from(BPS) + slippage)
                .map(|v| v / U256::from(BPS))
                .ok_or_else(|| CoreError::Overflow("amountInMaximum".into()))?,
        };
        let deadline = Utc::now().timestamp().max(0) as u64 + self.settings.deadline_secs;

        Ok(SwapPlan {
            trade_type,
            pool: quote.pool.pool,
            token_in,
            token_out,
            index_path: vec![quote.pool.index],
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            amount_limit,
            sqrt_price_limit_x96: default_sqrt_price_limit(token_in < token_out),
            deadline,
        })
    }
}
