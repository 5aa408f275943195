// tick_range.rs
//
// Aligned tick windows to query on-chain. An invalid window is "no data", never an error.

use crate::math::tick_math::{tick_from_price, MAX_TICK, MIN_TICK};

/// Ascending multiples of `spacing` covering `[min_price_tick, max_price_tick]`,
/// bounded to the AMM tick range. Empty for non-finite bounds, `min >= max` or `spacing <= 0`.
pub fn build_tick_range(min_price_tick: f64, max_price_tick: f64, spacing: i32) -> Vec<i32> {
    if !min_price_tick.is_finite() || !max_price_tick.is_finite() {
        return Vec::new();
    }
    if min_price_tick >= max_price_tick || spacing <= 0 {
        return Vec::new();
    }

    let s = spacing as f64;
    let aligned_min = (min_price_tick / s).ceil() * s;
    let aligned_max = (max_price_tick / s).floor() * s;

    // Grid points inside [MIN_TICK, MAX_TICK]
    let lowest = (MIN_TICK as f64 / s).ceil() * s;
    let highest = (MAX_TICK as f64 / s).floor() * s;

    let lo = aligned_min.max(lowest) as i64;
    let hi = aligned_max.min(highest) as i64;
    if lo > hi {
        return Vec::new();
    }

    (lo..=hi)
        .step_by(spacing as usize)
        .map(|t| t as i32)
        .collect()
}

/// Tick window for a human price window (token1 per token0), e.g. 0.01..0.99 chance.
pub fn tick_window_for_prices(min_price: f64, max_price: f64, dec0: u8, dec1: u8) -> Option<(i32, i32)> {
    if !(min_price.is_finite() && max_price.is_finite()) || min_price <= 0.0 || min_price >= max_price {
        return None;
    }
    let lo = tick_from_price(min_price, dec0, dec1);
    // +1 so the tick holding max_price is inside the window
    let hi = tick_from_price(max_price, dec0, dec1).saturating_add(1).min(MAX_TICK);
    if lo >= hi { None } else { Some((lo, hi)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_bounds_to_spacing() {
        assert_eq!(build_tick_range(-25.0, 130.0, 60), vec![0, 60, 120]);
        assert_eq!(build_tick_range(-60.0, 60.0, 60), vec![-60, 0, 60]);
        assert_eq!(build_tick_range(-121.0, -59.0, 60), vec![-120, -60]);
    }

    #[test]
    fn fractional_bounds_round_inward() {
        assert_eq!(build_tick_range(0.5, 20.5, 10), vec![10, 20]);
    }

    #[test]
    fn every_tick_is_a_multiple_of_spacing() {
        let ticks = build_tick_range(-10_007.0, 9_999.0, 200);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| t % 200 == 0));
        assert!(ticks.windows(2).all(|w| w[1] - w[0] == 200));
    }

    #[test]
    fn invalid_inputs_yield_empty_range() {
        assert!(build_tick_range(10.0, 10.0, 1).is_empty());
        assert!(build_tick_range(20.0, 10.0, 1).is_empty());
        assert!(build_tick_range(f64::NAN, 10.0, 1).is_empty());
        assert!(build_tick_range(0.0, f64::INFINITY, 1).is_empty());
        assert!(build_tick_range(0.0, 100.0, 0).is_empty());
        assert!(build_tick_range(0.0, 100.0, -10).is_empty());
    }

    #[test]
    fn window_without_grid_point_is_empty() {
        assert!(build_tick_range(1.0, 59.0, 60).is_empty());
    }

    #[test]
    fn clamps_to_amm_tick_range() {
        let ticks = build_tick_range(-1.0e7, -887_000.0, 200);
        assert_eq!(ticks.first(), Some(&-887_200));
        assert_eq!(ticks.last(), Some(&-887_000));

        let top = build_tick_range(887_000.0, 1.0e7, 1);
        assert_eq!(top.last(), Some(&MAX_TICK));
    }

    #[test]
    fn price_window_maps_to_ordered_ticks() {
        let (lo, hi) = tick_window_for_prices(0.01, 0.99, 18, 18).unwrap();
        assert!(lo < hi);
        assert!(lo < -46_000 && lo > -46_100, "lo {}", lo);
        assert!(hi <= 0 && hi > -110, "hi {}", hi);
        assert!(tick_window_for_prices(0.0, 0.5, 18, 18).is_none());
        assert!(tick_window_for_prices(0.6, 0.5, 18, 18).is_none());
    }
}
