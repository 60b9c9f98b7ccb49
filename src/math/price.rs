// Decimal price conversions: tick <-> price <-> sqrtPriceX96.
//
// Prices are `BigDecimal` carried at PRICE_PRECISION significant digits.
// sqrtPriceX96 values stay integers end to end; nothing here goes through f64
// except the initial guess in `price_to_tick`, which is corrected exactly.

use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use ethers::types::U256;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};

use crate::error::{CoreError, CoreResult};
use crate::math::tick_math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};

/// Significant digits kept on returned prices.
pub const PRICE_PRECISION: u64 = 40;

// Working precision for intermediate products.
const WORK_PRECISION: u64 = 64;

// Valid prices lie within about 1e-39..1e39; anything past 10^±80 is
// rejected before any power of ten is materialized.
const MAX_PRICE_MAGNITUDE: i64 = 80;

// |tick| <= 887272 < 2^20
const POWER_TABLE_LEN: usize = 20;

/// 1.0001^(2^i) for i in 0..20.
fn tick_base_powers() -> &'static [BigDecimal; POWER_TABLE_LEN] {
    static POWERS: OnceLock<[BigDecimal; POWER_TABLE_LEN]> = OnceLock::new();
    POWERS.get_or_init(|| {
        let mut powers: [BigDecimal; POWER_TABLE_LEN] = Default::default();
        let mut current = BigDecimal::new(BigInt::from(10_001), 4);
        for slot in powers.iter_mut() {
            *slot = current.clone();
            current = (&current * &current).with_prec(WORK_PRECISION);
        }
        powers
    })
}

pub fn u256_to_bigint(u: U256) -> BigInt {
    let mut buf = [0u8; 32];
    u.to_big_endian(&mut buf);
    BigInt::from_bytes_be(Sign::Plus, &buf)
}

/// Fails with `Overflow` when the value needs more than `bits` bits.
pub fn bigint_to_uint(value: &BigInt, bits: u64) -> CoreResult<U256> {
    if value.is_negative() {
        return Err(CoreError::invalid(format!("negative integer {}", value)));
    }
    if value.bits() > bits {
        return Err(CoreError::Overflow(format!("{} does not fit in {} bits", value, bits)));
    }
    let (_, bytes) = value.to_bytes_be();
    Ok(U256::from_big_endian(&bytes))
}

/// price = 1.0001^tick, by repeated squaring over the precomputed power table.
pub fn tick_to_price(tick: i32) -> CoreResult<BigDecimal> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(CoreError::invalid(format!("tick {} outside [{}, {}]", tick, MIN_TICK, MAX_TICK)));
    }

    let powers = tick_base_powers();
    let abs_tick = tick.unsigned_abs();
    let mut price = BigDecimal::one();
    for (i, power) in powers.iter().enumerate() {
        if abs_tick & (1 << i) != 0 {
            price = (&price * power).with_prec(WORK_PRECISION);
        }
    }
    if tick < 0 {
        price = price.inverse();
    }
    Ok(price.with_prec(PRICE_PRECISION))
}

/// Floor of log_1.0001(price), clamped to the valid tick range.
pub fn price_to_tick(price: &BigDecimal) -> CoreResult<i32> {
    if price.sign() != Sign::Plus {
        return Err(CoreError::invalid(format!("price must be positive, got {}", price)));
    }

    // f64 estimate from the mantissa/exponent split, so huge or tiny prices
    // never overflow the float.
    let (digits, scale) = price.as_bigint_and_exponent();
    let digit_count = digits.to_string().len() as i64;
    let lead: f64 = digits.to_string().chars().take(17).collect::<String>().parse().unwrap_or(1.0);
    let exp10 = digit_count.min(17) - 1;
    let mantissa = lead / 10f64.powi(exp10 as i32);
    let log10 = mantissa.log10() + (digit_count - 1 - scale) as f64;
    let estimate = (log10 * std::f64::consts::LN_10 / 1.0001f64.ln()).floor();

    let mut tick = estimate.clamp(MIN_TICK as f64, MAX_TICK as f64) as i32;

    // Correct the float estimate against exact powers.
    while tick > MIN_TICK && tick_to_price(tick)? > *price {
        tick -= 1;
    }
    while tick < MAX_TICK && tick_to_price(tick + 1)? <= *price {
        tick += 1;
    }
    Ok(tick)
}

/// price = (sqrtPriceX96 / 2^96)^2, computed exactly then rounded to PRICE_PRECISION.
pub fn sqrt_price_x96_to_price(sqrt_price_x96: U256) -> BigDecimal {
    let sqrt = u256_to_bigint(sqrt_price_x96);
    if sqrt.is_zero() {
        return BigDecimal::zero();
    }
    // 1 / 2^192 == 5^192 / 10^192, so the quotient is an exact decimal
    let numerator = &sqrt * &sqrt * num_traits::pow(BigInt::from(5), 192);
    BigDecimal::new(numerator, 192).with_prec(PRICE_PRECISION).normalized()
}

/// floor(sqrt(price) * 2^96). Fails with `InvalidInput` for non-positive
/// prices and results below MIN_SQRT_RATIO, and with `Overflow` above
/// MAX_SQRT_RATIO.
pub fn price_to_sqrt_price_x96(price: &BigDecimal) -> CoreResult<U256> {
    if price.sign() != Sign::Plus {
        return Err(CoreError::invalid(format!("price must be positive, got {}", price)));
    }

    // price = digits * 10^-scale; floor(sqrt(floor(x))) == floor(sqrt(x))
    let (digits, scale) = price.as_bigint_and_exponent();
    // log10(price) to within one
    let magnitude = ((digits.bits() as i64).saturating_mul(30_103) / 100_000).saturating_sub(scale);
    if magnitude < -MAX_PRICE_MAGNITUDE {
        return Err(CoreError::invalid("price is below the smallest representable sqrt price"));
    }
    if magnitude > MAX_PRICE_MAGNITUDE {
        return Err(CoreError::Overflow("price exceeds the largest representable sqrt price".into()));
    }

    let q192: BigInt = BigInt::one() << 192;
    let radicand = if scale >= 0 {
        digits * q192 / num_traits::pow(BigInt::from(10), scale as usize)
    } else {
        digits * q192 * num_traits::pow(BigInt::from(10), scale.unsigned_abs() as usize)
    };
    let sqrt = bigint_to_uint(&num_integer::Roots::sqrt(&radicand), 160)?;
    if sqrt < MIN_SQRT_RATIO {
        return Err(CoreError::invalid(format!("sqrt price {} is below the minimum ratio", sqrt)));
    }
    if sqrt > MAX_SQRT_RATIO {
        return Err(CoreError::Overflow(format!("sqrt price {} is above the maximum ratio", sqrt)));
    }
    Ok(sqrt)
}
