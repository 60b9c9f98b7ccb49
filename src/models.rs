use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};

use crate::error::CoreResult;
use crate::math::{get_tick_spacing, sqrt_price_x96_to_price};

/// One deployed pool as reported by the pool manager's `getAllPools`.
///
/// token0 < token1 always holds for records coming off chain. Records are
/// replaced wholesale on refresh, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub index: u32,
    pub fee: u32,          // uint24, ppm
    pub fee_protocol: u8,
    pub tick_lower: i32,   // int24
    pub tick_upper: i32,   // int24
    pub tick: i32,         // int24
    pub sqrt_price_x96: U256, // uint160
    pub liquidity: u128,
}

impl Pool {
    /// Caller passes an already canonical pair.
    pub fn matches_pair(&self, token0: Address, token1: Address) -> bool {
        self.token0 == token0 && self.token1 == token1
    }

    /// token1 per token0.
    pub fn current_price(&self) -> BigDecimal {
        sqrt_price_x96_to_price(self.sqrt_price_x96)
    }

    pub fn tick_spacing(&self) -> CoreResult<i32> {
        get_tick_spacing(self.fee)
    }
}

/// A token pair known to the pool manager (`getPairs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    pub token0: Address,
    pub token1: Address,
}

/// A liquidity provider's claim on one pool, keyed to it by (token0, token1, index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub id: U256,
    pub owner: Address,
    pub token0: Address,
    pub token1: Address,
    pub index: u32,
    pub fee: u32,
    pub liquidity: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
}

impl Position {
    /// Fully burned and collected; hidden from views.
    pub fn is_closed(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed0 == 0 && self.tokens_owed1 == 0
    }
}

/// Which side of a swap the user fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// token_in amount fixed, solve for token_out
    ExactInput,
    /// token_out amount fixed, solve for token_in
    ExactOutput,
}
