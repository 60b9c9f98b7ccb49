// Integer tick math: exact Q64.96 ratio at a tick, swap price limits,
// tick-spacing lookup and alignment.

use ethers::types::U256;

use crate::error::{CoreError, CoreResult};

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// get_sqrt_ratio_at_tick(MIN_TICK)
pub const MIN_SQRT_RATIO: U256 = U256([4_295_128_739, 0, 0, 0]);
/// get_sqrt_ratio_at_tick(MAX_TICK)
pub const MAX_SQRT_RATIO: U256 = U256([0x5d95_1d52_6398_8d26, 0xefd1_fc6a_5064_8849, 0xfffd_8963, 0]);

/// Fee tiers (ppm) the pool manager accepts, with their tick spacing.
pub const FEE_TIER_SPACINGS: [(u32, i32); 3] = [(500, 10), (3000, 60), (10_000, 200)];

// 1/sqrt(1.0001)^(2^i) in Q128.128, i = 1..19 (bit 0 handled separately)
const RATIO_MULTIPLIERS: [(u32, u128); 19] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x09aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x005d6af8dedb81196699c329225ee604),
    (0x40000, 0x0002216e584f5fa1ea926041bedfe98),
    (0x80000, 0x00000000048a170391f7dc42444e8fa2),
];

fn check_tick(tick: i32) -> CoreResult<()> {
    if (MIN_TICK..=MAX_TICK).contains(&tick) {
        Ok(())
    } else {
        Err(CoreError::invalid(format!("tick {} outside [{}, {}]", tick, MIN_TICK, MAX_TICK)))
    }
}

/// Exact sqrt(1.0001^tick) * 2^96, rounded up, matching the pool contract.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> CoreResult<U256> {
    check_tick(tick)?;
    let abs_tick = tick.unsigned_abs();

    // Q128.128
    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        U256::one() << 128
    };
    for (bit, multiplier) in RATIO_MULTIPLIERS {
        if abs_tick & bit != 0 {
            ratio = (ratio * U256::from(multiplier)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up
    let round_up = !(ratio & U256::from(u32::MAX)).is_zero();
    Ok((ratio >> 32) + if round_up { U256::one() } else { U256::zero() })
}

/// Price limit handed to quote/swap calls so they may move the price as far as needed.
pub fn default_sqrt_price_limit(zero_for_one: bool) -> U256 {
    if zero_for_one {
        MIN_SQRT_RATIO + U256::one()
    } else {
        MAX_SQRT_RATIO - U256::one()
    }
}

/// Tick spacing for a fee tier. Unknown tiers are rejected so a pool is never
/// created against a misaligned grid.
pub fn get_tick_spacing(fee: u32) -> CoreResult<i32> {
    FEE_TIER_SPACINGS
        .iter()
        .find(|(tier, _)| *tier == fee)
        .map(|(_, spacing)| *spacing)
        .ok_or_else(|| CoreError::invalid(format!("unsupported fee tier {}", fee)))
}

/// Rounds `tick` to the nearest multiple of `spacing`.
///
/// Ties round toward positive infinity (5 with spacing 10 gives 10, -5 gives 0).
/// A result that would leave the valid tick range is pulled back by one spacing.
pub fn nearest_usable_tick(tick: i32, spacing: i32) -> CoreResult<i32> {
    if spacing <= 0 {
        return Err(CoreError::invalid(format!("tick spacing must be positive, got {}", spacing)));
    }
    check_tick(tick)?;

    let half = spacing / 2;
    let rounded = (tick + half).div_euclid(spacing) * spacing;
    Ok(if rounded < MIN_TICK {
        rounded + spacing
    } else if rounded > MAX_TICK {
        rounded - spacing
    } else {
        rounded
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_SQRT_RATIO_DEC: &str = "1461446703485210103287273052203988822378723970342";

    #[test]
    fn test_sqrt_ratio_constants() {
        assert_eq!(MIN_SQRT_RATIO, U256::from(4_295_128_739u64));
        assert_eq!(MAX_SQRT_RATIO, U256::from_dec_str(MAX_SQRT_RATIO_DEC).unwrap());
    }

    #[test]
    fn test_sqrt_ratio_at_tick_zero_is_q96() {
        assert_eq!(get_sqrt_ratio_at_tick(0).unwrap(), U256::one() << 96);
    }

    #[test]
    fn test_sqrt_ratio_at_tick_bounds() {
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert!(get_sqrt_ratio_at_tick(MAX_TICK + 1).is_err());
        assert!(get_sqrt_ratio_at_tick(MIN_TICK - 1).is_err());
    }

    #[test]
    fn test_sqrt_ratio_symmetry() {
        // sqrt(1.0001^t) * sqrt(1.0001^-t) == 1, so the product is ~2^192
        let up = get_sqrt_ratio_at_tick(60).unwrap();
        let down = get_sqrt_ratio_at_tick(-60).unwrap();
        let product = up.full_mul(down);
        let q192 = ethers::types::U512::one() << 192;
        let diff = if product > q192 { product - q192 } else { q192 - product };
        assert!(diff < ethers::types::U512::one() << 110);
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(default_sqrt_price_limit(true), U256::from(4_295_128_740u64));
        assert_eq!(
            default_sqrt_price_limit(false),
            U256::from_dec_str(MAX_SQRT_RATIO_DEC).unwrap() - U256::one()
        );
    }

    #[test]
    fn test_tick_spacing_table() {
        assert_eq!(get_tick_spacing(500).unwrap(), 10);
        assert_eq!(get_tick_spacing(3000).unwrap(), 60);
        assert_eq!(get_tick_spacing(10_000).unwrap(), 200);
        assert!(matches!(get_tick_spacing(2500), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_nearest_usable_tick() {
        assert_eq!(nearest_usable_tick(0, 60).unwrap(), 0);
        assert_eq!(nearest_usable_tick(29, 60).unwrap(), 0);
        assert_eq!(nearest_usable_tick(30, 60).unwrap(), 60);
        assert_eq!(nearest_usable_tick(-29, 60).unwrap(), 0);
        assert_eq!(nearest_usable_tick(-30, 60).unwrap(), 0);
        assert_eq!(nearest_usable_tick(-31, 60).unwrap(), -60);
        assert_eq!(nearest_usable_tick(5, 10).unwrap(), 10);
        assert_eq!(nearest_usable_tick(-5, 10).unwrap(), 0);
    }

    #[test]
    fn test_nearest_usable_tick_stays_in_range() {
        assert_eq!(nearest_usable_tick(MAX_TICK, 200).unwrap(), 887_200);
        assert_eq!(nearest_usable_tick(MIN_TICK, 200).unwrap(), -887_200);
        assert_eq!(nearest_usable_tick(MAX_TICK, 1).unwrap(), MAX_TICK);
    }

    #[test]
    fn test_nearest_usable_tick_rejects_bad_spacing() {
        assert!(nearest_usable_tick(100, 0).is_err());
        assert!(nearest_usable_tick(100, -10).is_err());
    }
}
