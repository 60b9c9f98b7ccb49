pub mod format;
pub mod price;
pub mod tick_math;

pub use format::{
    format_fee_tier, format_price_for_ui, format_price_range, format_units, parse_address,
    parse_units, short_address,
};
pub use price::{
    price_to_sqrt_price_x96, price_to_tick, sqrt_price_x96_to_price, tick_to_price,
    PRICE_PRECISION,
};
pub use tick_math::{
    default_sqrt_price_limit, get_sqrt_ratio_at_tick, get_tick_spacing, nearest_usable_tick,
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK,
};
