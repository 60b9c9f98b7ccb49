// Contract bindings for the pool manager, position manager, swap router and
// ERC-20 reads, plus conversion of the returned tuples into our records.

use ethers::contract::abigen;
use ethers::types::{Address, U256};

use crate::error::{CoreError, CoreResult};
use crate::models::{Pair, Pool, Position};

abigen!(
    PoolManager,
    r#"[
      {
        "type": "function",
        "name": "getAllPools",
        "stateMutability": "view",
        "inputs": [],
        "outputs": [
          {
            "name": "poolsInfo",
            "type": "tuple[]",
            "components": [
              {"name": "pool", "type": "address"},
              {"name": "token0", "type": "address"},
              {"name": "token1", "type": "address"},
              {"name": "index", "type": "uint32"},
              {"name": "fee", "type": "uint24"},
              {"name": "feeProtocol", "type": "uint8"},
              {"name": "tickLower", "type": "int24"},
              {"name": "tickUpper", "type": "int24"},
              {"name": "tick", "type": "int24"},
              {"name": "sqrtPriceX96", "type": "uint160"},
              {"name": "liquidity", "type": "uint128"}
            ]
          }
        ]
      },
      {
        "type": "function",
        "name": "getPairs",
        "stateMutability": "view",
        "inputs": [],
        "outputs": [
          {
            "name": "",
            "type": "tuple[]",
            "components": [
              {"name": "token0", "type": "address"},
              {"name": "token1", "type": "address"}
            ]
          }
        ]
      }
    ]"#
);

abigen!(
    PositionManager,
    r#"[
      {
        "type": "function",
        "name": "getAllPositions",
        "stateMutability": "view",
        "inputs": [],
        "outputs": [
          {
            "name": "positionInfo",
            "type": "tuple[]",
            "components": [
              {"name": "id", "type": "uint256"},
              {"name": "owner", "type": "address"},
              {"name": "token0", "type": "address"},
              {"name": "token1", "type": "address"},
              {"name": "index", "type": "uint32"},
              {"name": "fee", "type": "uint24"},
              {"name": "liquidity", "type": "uint128"},
              {"name": "tickLower", "type": "int24"},
              {"name": "tickUpper", "type": "int24"},
              {"name": "tokensOwed0", "type": "uint128"},
              {"name": "tokensOwed1", "type": "uint128"},
              {"name": "feeGrowthInside0LastX128", "type": "uint256"},
              {"name": "feeGrowthInside1LastX128", "type": "uint256"}
            ]
          }
        ]
      }
    ]"#
);

// The quote functions simulate a swap and are not view; they are only eth_call'ed.
abigen!(
    SwapRouter,
    r#"[
      {
        "type": "function",
        "name": "quoteExactInput",
        "stateMutability": "nonpayable",
        "inputs": [
          {
            "name": "params",
            "type": "tuple",
            "components": [
              {"name": "tokenIn", "type": "address"},
              {"name": "tokenOut", "type": "address"},
              {"name": "indexPath", "type": "uint32[]"},
              {"name": "amountIn", "type": "uint256"},
              {"name": "sqrtPriceLimitX96", "type": "uint160"}
            ]
          }
        ],
        "outputs": [{"name": "amountOut", "type": "uint256"}]
      },
      {
        "type": "function",
        "name": "quoteExactOutput",
        "stateMutability": "nonpayable",
        "inputs": [
          {
            "name": "params",
            "type": "tuple",
            "components": [
              {"name": "tokenIn", "type": "address"},
              {"name": "tokenOut", "type": "address"},
              {"name": "indexPath", "type": "uint32[]"},
              {"name": "amountOut", "type": "uint256"},
              {"name": "sqrtPriceLimitX96", "type": "uint160"}
            ]
          }
        ],
        "outputs": [{"name": "amountIn", "type": "uint256"}]
      }
    ]"#
);

abigen!(
    ERC20,
    r#"[
        function symbol() external view returns (string)
        function decimals() external view returns (uint8)
        function balanceOf(address account) external view returns (uint256)
    ]"#
);

/// `getAllPools` element: pool, token0, token1, index, fee, feeProtocol,
/// tickLower, tickUpper, tick, sqrtPriceX96, liquidity.
pub type PoolInfo = (Address, Address, Address, u32, u32, u8, i32, i32, i32, U256, u128);

/// `getPairs` element.
pub type PairInfo = (Address, Address);

/// `getAllPositions` element: id, owner, token0, token1, index, fee, liquidity,
/// tickLower, tickUpper, tokensOwed0, tokensOwed1, feeGrowthInside{0,1}LastX128.
pub type PositionInfo = (
    U256,
    Address,
    Address,
    Address,
    u32,
    u32,
    u128,
    i32,
    i32,
    u128,
    u128,
    U256,
    U256,
);

/// `quoteExactInput` / `quoteExactOutput` argument: tokenIn, tokenOut,
/// indexPath, amount, sqrtPriceLimitX96.
pub type QuoteArgs = (Address, Address, Vec<u32>, U256, U256);

fn check_bits(value: U256, bits: usize, what: &str) -> CoreResult<U256> {
    if value.bits() > bits {
        return Err(CoreError::Overflow(format!("{} = {} exceeds {} bits", what, value, bits)));
    }
    Ok(value)
}

pub fn pool_from_info(info: PoolInfo) -> CoreResult<Pool> {
    let (pool, token0, token1, index, fee, fee_protocol, tick_lower, tick_upper, tick, sqrt_price_x96, liquidity) =
        info;
    Ok(Pool {
        pool,
        token0,
        token1,
        index,
        fee,
        fee_protocol,
        tick_lower,
        tick_upper,
        tick,
        sqrt_price_x96: check_bits(sqrt_price_x96, 160, "sqrtPriceX96")?,
        liquidity,
    })
}

pub fn pair_from_info((token0, token1): PairInfo) -> Pair {
    Pair { token0, token1 }
}

pub fn position_from_info(info: PositionInfo) -> Position {
    let (
        id,
        owner,
        token0,
        token1,
        index,
        fee,
        liquidity,
        tick_lower,
        tick_upper,
        tokens_owed0,
        tokens_owed1,
        fee_growth_inside0_last_x128,
        fee_growth_inside1_last_x128,
    ) = info;
    Position {
        id,
        owner,
        token0,
        token1,
        index,
        fee,
        liquidity,
        tick_lower,
        tick_upper,
        tokens_owed0,
        tokens_owed1,
        fee_growth_inside0_last_x128,
        fee_growth_inside1_last_x128,
    }
}
