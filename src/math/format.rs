// Display helpers. Nothing in here feeds back into a numeric computation path.

use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::math::price::tick_to_price;

const UI_DECIMALS: u32 = 6;

/// Collapses sub-1e-6 prices to "0" and prices above 1e6 to "∞"; everything
/// else is rounded half-up to 6 decimals with trailing zeros stripped.
pub fn format_price_for_ui(price: &BigDecimal) -> String {
    if price.is_zero() {
        return "0".to_string();
    }
    if *price < BigDecimal::new(BigInt::one(), UI_DECIMALS as i64) {
        return "0".to_string();
    }
    if *price > BigDecimal::from(1_000_000) {
        return "∞".to_string();
    }

    let (digits, scale) = price.as_bigint_and_exponent();
    let target = UI_DECIMALS as i64;
    let scaled = if scale <= target {
        digits * num_traits::pow(BigInt::from(10), (target - scale) as usize)
    } else {
        let divisor = num_traits::pow(BigInt::from(10), (scale - target) as usize);
        let (q, r) = digits.div_rem(&divisor);
        if r * 2 >= divisor { q + 1 } else { q }
    };

    let unit = num_traits::pow(BigInt::from(10), UI_DECIMALS as usize);
    let (int_part, frac_part) = scaled.div_rem(&unit);
    let frac = format!("{:0>width$}", frac_part.to_string(), width = UI_DECIMALS as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac)
    }
}

/// "lower ~ upper" for a tick range.
pub fn format_price_range(tick_lower: i32, tick_upper: i32) -> CoreResult<String> {
    let lower = format_price_for_ui(&tick_to_price(tick_lower)?);
    let upper = format_price_for_ui(&tick_to_price(tick_upper)?);
    Ok(format!("{} ~ {}", lower, upper))
}

/// Fee tier (parts per million) as a percentage string: 3000 -> "0.3%".
pub fn format_fee_tier(fee: u32) -> String {
    let percent = (Decimal::from(fee) / Decimal::from(10_000u32)).normalize();
    format!("{}%", percent)
}

/// 0x1234...abcd
pub fn short_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Strict `0x` + 40 hex parsing; any case is accepted.
pub fn parse_address(input: &str) -> CoreResult<Address> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| CoreError::invalid(format!("address must start with 0x: {:?}", input)))?;
    if hex_part.len() != 40 {
        return Err(CoreError::invalid(format!("address must be 40 hex digits: {:?}", input)));
    }
    let bytes = hex::decode(hex_part)
        .map_err(|e| CoreError::invalid(format!("address {:?} is not hex: {}", input, e)))?;
    Ok(Address::from_slice(&bytes))
}

/// Human amount -> base units ("1.5", 18 -> 1.5e18).
pub fn parse_units(amount: &str, decimals: u8) -> CoreResult<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(CoreError::invalid(format!("amount must be a non-negative number: {:?}", amount)));
    }
    let parsed = ethers::utils::parse_units(trimmed, decimals as u32)
        .map_err(|e| CoreError::invalid(format!("amount {:?}: {}", amount, e)))?;
    Ok(parsed.into())
}

/// Base units -> human amount without trailing zeros (1.5e18, 18 -> "1.5").
pub fn format_units(amount: U256, decimals: u8) -> String {
    match ethers::utils::format_units(amount, decimals as u32) {
        Ok(s) if s.contains('.') => s.trim_end_matches('0').trim_end_matches('.').to_string(),
        Ok(s) => s,
        Err(_) => amount.to_string(),
    }
}
