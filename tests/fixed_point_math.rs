// tests/fixed_point_math.rs
// ===================================
// Tick / price / sqrtPriceX96 conversions and tick alignment.

use bigdecimal::BigDecimal;
use ethers::types::U256;
use proptest::prelude::*;
use std::str::FromStr;

use simpleswap_core::math::{
    format_price_for_ui, get_sqrt_ratio_at_tick, get_tick_spacing, nearest_usable_tick,
    price_to_sqrt_price_x96, price_to_tick, sqrt_price_x96_to_price, tick_to_price, MAX_TICK,
    MIN_TICK,
};
use simpleswap_core::CoreError;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[test]
fn test_tick_price_round_trip() {
    for tick in [-500_000, -1, 0, 1, 500_000] {
        let price = tick_to_price(tick).unwrap();
        let back = price_to_tick(&price).unwrap();
        assert!((back - tick).abs() <= 1, "tick {} came back as {}", tick, back);
    }
}

#[test]
fn test_tick_to_price_relative_error_is_tiny() {
    // 1.0001^10000 = 2.718145926825224864037...
    let price = tick_to_price(10_000).unwrap();
    let expected = dec("2.718145926825224864037");
    let err = ((&price - &expected) / &expected).abs();
    assert!(err < dec("1e-20"), "relative error {}", err);
}

#[test]
fn test_price_to_tick_rejects_non_positive() {
    assert!(matches!(price_to_tick(&dec("0")), Err(CoreError::InvalidInput(_))));
    assert!(matches!(price_to_tick(&dec("-2.5")), Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_sqrt_price_x96_exact_prices() {
    assert_eq!(sqrt_price_x96_to_price(U256::one() << 96), dec("1"));
    assert_eq!(sqrt_price_x96_to_price(U256::one() << 97), dec("4"));
    assert_eq!(sqrt_price_x96_to_price(U256::one() << 95), dec("0.25"));
}

#[test]
fn test_sqrt_price_above_2_pow_96_keeps_precision() {
    // 2^96 + 1: a double would collapse this to exactly 1.0
    let price = sqrt_price_x96_to_price((U256::one() << 96) + U256::one());
    assert!(price > dec("1"));
    assert!(price < dec("1.000000000000000000000000001"));
}

#[test]
fn test_price_to_sqrt_price_x96() {
    assert_eq!(price_to_sqrt_price_x96(&dec("1")).unwrap(), U256::one() << 96);
    assert_eq!(price_to_sqrt_price_x96(&dec("4")).unwrap(), U256::one() << 97);
    assert!(matches!(price_to_sqrt_price_x96(&dec("0")), Err(CoreError::InvalidInput(_))));
    // sqrt(2^130) * 2^96 = 2^161
    let too_big = BigDecimal::from_str(&(U256::one() << 130).to_string()).unwrap();
    assert!(matches!(price_to_sqrt_price_x96(&too_big), Err(CoreError::Overflow(_))));
}

#[test]
fn test_tick_spacing_table() {
    assert_eq!(get_tick_spacing(500).unwrap(), 10);
    assert_eq!(get_tick_spacing(3000).unwrap(), 60);
    assert_eq!(get_tick_spacing(10_000).unwrap(), 200);
    assert!(matches!(get_tick_spacing(100), Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_nearest_usable_tick_ties_round_up() {
    assert_eq!(nearest_usable_tick(5, 10).unwrap(), 10);
    assert_eq!(nearest_usable_tick(-5, 10).unwrap(), 0);
    assert_eq!(nearest_usable_tick(-6, 10).unwrap(), -10);
    assert_eq!(nearest_usable_tick(29, 60).unwrap(), 0);
    assert_eq!(nearest_usable_tick(MAX_TICK, 60).unwrap(), 887_220);
    assert_eq!(nearest_usable_tick(MIN_TICK, 60).unwrap(), -887_220);
}

#[test]
fn test_tick_to_price_matches_sqrt_ratio() {
    // (sqrtRatioAtTick / 2^96)^2 and 1.0001^tick agree to ~1e-9
    for tick in [-200_000, -60, 0, 60, 200_000] {
        let via_sqrt = sqrt_price_x96_to_price(get_sqrt_ratio_at_tick(tick).unwrap());
        let direct = tick_to_price(tick).unwrap();
        let err = ((&via_sqrt - &direct) / &direct).abs();
        assert!(err < dec("1e-9"), "tick {} error {}", tick, err);
    }
}

#[test]
fn test_format_price_for_ui_contract() {
    assert_eq!(format_price_for_ui(&dec("0.0000001")), "0");
    assert_eq!(format_price_for_ui(&dec("1000001")), "∞");
    assert_eq!(format_price_for_ui(&dec("1.23456789")), "1.234568");
    assert_eq!(format_price_for_ui(&dec("2.5")), "2.5");
    assert_eq!(format_price_for_ui(&dec("4")), "4");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: tickToPrice is strictly increasing
    #[test]
    fn prop_tick_to_price_monotonic(tick in MIN_TICK..MAX_TICK) {
        let here = tick_to_price(tick).unwrap();
        let next = tick_to_price(tick + 1).unwrap();
        prop_assert!(here < next);
    }

    /// Property: nearestUsableTick lands on the grid and inside the range
    #[test]
    fn prop_nearest_usable_tick_aligned(
        tick in MIN_TICK..=MAX_TICK,
        spacing in prop::sample::select(vec![10, 60, 200])
    ) {
        let t = nearest_usable_tick(tick, spacing).unwrap();
        prop_assert_eq!(t % spacing, 0);
        prop_assert!((MIN_TICK..=MAX_TICK).contains(&t));
        prop_assert!((t - tick).abs() <= spacing);
    }

    /// Property: round trip within one tick anywhere in [-500000, 500000]
    #[test]
    fn prop_round_trip(tick in -500_000i32..=500_000) {
        let back = price_to_tick(&tick_to_price(tick).unwrap()).unwrap();
        prop_assert!((back - tick).abs() <= 1);
    }
}
