use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use std::str::FromStr;

use crate::engine::pool_index::canonicalize_pair;
use crate::error::{CoreError, CoreResult};
use crate::math::{
    get_tick_spacing, nearest_usable_tick, parse_address, price_to_sqrt_price_x96, MAX_TICK,
    MIN_TICK,
};

/// Raw add-pool input as the form hands it over.
///
/// Ticks and the initial price are read in canonical token0/token1 terms
/// whatever order the tokens were typed in. A missing bound means the
/// full-range edge for the fee tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePoolForm {
    pub token_a: String,
    pub token_b: String,
    pub fee: u32,
    pub tick_lower: Option<i32>,
    pub tick_upper: Option<i32>,
    pub initial_price: Option<String>,
}

/// Checked `createPool` arguments: canonical pair, supported fee tier,
/// spacing-aligned bounds with lower < upper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePoolParams {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub sqrt_price_x96: Option<U256>,
}

impl CreatePoolParams {
    /// Everything is checked locally, before any remote call.
    pub fn validate(form: &CreatePoolForm) -> CoreResult<Self> {
        let token_a = parse_address(&form.token_a)?;
        let token_b = parse_address(&form.token_b)?;
        if token_a == token_b {
            return Err(CoreError::invalid("pool tokens must be two different addresses"));
        }
        if token_a.is_zero() || token_b.is_zero() {
            return Err(CoreError::invalid("pool tokens cannot be the zero address"));
        }
        let (token0, token1) = canonicalize_pair(token_a, token_b);

        let tick_spacing = get_tick_spacing(form.fee)?;
        let tick_lower = nearest_usable_tick(form.tick_lower.unwrap_or(MIN_TICK), tick_spacing)?;
        let tick_upper = nearest_usable_tick(form.tick_upper.unwrap_or(MAX_TICK), tick_spacing)?;
        if tick_lower >= tick_upper {
            return Err(CoreError::invalid(format!(
                "tick range [{}, {}] is empty at spacing {}",
                tick_lower, tick_upper, tick_spacing
            )));
        }

        let sqrt_price_x96 = match form.initial_price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let price = BigDecimal::from_str(raw)
                    .map_err(|e| CoreError::invalid(format!("initial price {:?}: {}", raw, e)))?;
                Some(price_to_sqrt_price_x96(&price)?)
            }
        };

        Ok(Self {
            token0,
            token1,
            fee: form.fee,
            tick_spacing,
            tick_lower,
            tick_upper,
            sqrt_price_x96,
        })
    }
}
