use rocket::serde::{Deserialize, Serialize};

use crate::engine::{PoolView, PositionView, Quote};

#[derive(Deserialize, rocket::FromForm)]
pub struct QuoteQuery {
    pub token_in: String,
    pub token_out: String,
    pub amount: String,
    pub exact_output: Option<bool>,
}

#[derive(Deserialize, rocket::FromForm)]
pub struct PositionsQuery {
    pub owner: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct PoolRow {
    pub pool: String,
    pub token0: String,
    pub token1: String,
    pub index: u32,
    pub token: String,
    pub fee_tier: String,
    pub price_range: String,
    pub current_price: String,
    pub liquidity: String,  // u128, as string for JS clients
    pub reserve0: String,
    pub reserve1: String,
}

impl From<PoolView> for PoolRow {
    fn from(v: PoolView) -> Self {
        PoolRow {
            pool: format!("{:?}", v.pool),
            token0: format!("{:?}", v.token0),
            token1: format!("{:?}", v.token1),
            index: v.index,
            token: v.token,
            fee_tier: v.fee_tier,
            price_range: v.price_range,
            current_price: v.current_price,
            liquidity: v.liquidity.to_string(),
            reserve0: v.reserve0.to_string(),
            reserve1: v.reserve1.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct TokenRow {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Serialize)]
pub struct PositionRow {
    pub id: String,
    pub pool: String,
    pub token: String,
    pub fee_tier: String,
    pub price_range: String,
    pub current_price: String,
    pub in_range: bool,
    pub liquidity: String,
    pub tokens_owed0: String,
    pub tokens_owed1: String,
}

impl From<PositionView> for PositionRow {
    fn from(v: PositionView) -> Self {
        PositionRow {
            id: v.id.to_string(),
            pool: format!("{:?}", v.pool),
            token: v.token,
            fee_tier: v.fee_tier,
            price_range: v.price_range,
            current_price: v.current_price,
            in_range: v.in_range,
            liquidity: v.liquidity.to_string(),
            tokens_owed0: v.tokens_owed0.to_string(),
            tokens_owed1: v.tokens_owed1.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub trade_type: String,
    pub pool: String,
    pub pool_index: u32,
    pub fee_tier: String,
    pub amount_in: String,   // base units
    pub amount_out: String,  // base units
    pub counterpart: String, // human units of the solved side
    pub candidates: usize,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        QuoteResponse {
            trade_type: format!("{:?}", q.trade_type),
            pool: format!("{:?}", q.pool.pool),
            pool_index: q.pool.index,
            fee_tier: crate::math::format_fee_tier(q.pool.fee),
            amount_in: q.amount_in.to_string(),
            amount_out: q.amount_out.to_string(),
            counterpart: q.counterpart,
            candidates: q.candidates,
        }
    }
}
