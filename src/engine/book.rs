// book.rs
//
// One full projection pass: tick reads -> curve -> reference + orientation -> buckets ->
// formatted levels. Pure and synchronous; every refresh recomputes from scratch.

use serde::{Deserialize, Serialize};

use crate::engine::buckets::{aggregate_buckets, price_decimals, BucketParams, PriceFilter};
use crate::engine::curve::build_pool_curve;
use crate::engine::format::{format_levels, format_price, LevelUnits};
use crate::engine::locator::locate_reference_tick;
use crate::engine::orientation::resolve_orientation;
use crate::engine::tick_range::build_tick_range;
use crate::error::ConfigError;
use crate::models::{LivePoolState, OrderBook, PoolDescriptor, TickRead};

pub const DEFAULT_ROWS_PER_SIDE: u32 = 8;
pub const DEFAULT_BUCKET_SIZE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookConfig {
    pub bucket_size: f64,
    pub rows_per_side: u32,
    pub min_price_tick: i32,
    pub max_price_tick: i32,
    #[serde(default)]
    pub price_filter: PriceFilter,
}

impl OrderBookConfig {
    pub fn new(min_price_tick: i32, max_price_tick: i32) -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            rows_per_side: DEFAULT_ROWS_PER_SIDE,
            min_price_tick,
            max_price_tick,
            price_filter: PriceFilter::None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bucket_size.is_finite() && self.bucket_size > 0.0) {
            return Err(ConfigError::InvalidOrderBook(format!("bucket size {} is not positive", self.bucket_size)));
        }
        if self.rows_per_side == 0 {
            return Err(ConfigError::InvalidOrderBook("rows per side must be at least 1".into()));
        }
        if self.min_price_tick >= self.max_price_tick {
            return Err(ConfigError::InvalidOrderBook(format!(
                "price tick window [{}, {}] is empty",
                self.min_price_tick, self.max_price_tick
            )));
        }
        Ok(())
    }

    /// Ticks to read for this window on a pool with `tick_spacing`.
    pub fn tick_range(&self, tick_spacing: i32) -> Vec<i32> {
        build_tick_range(self.min_price_tick as f64, self.max_price_tick as f64, tick_spacing)
    }

    fn bucket_params(&self) -> BucketParams {
        BucketParams {
            bucket_size: self.bucket_size,
            rows_per_side: self.rows_per_side as usize,
            price_filter: self.price_filter,
        }
    }
}

/// Project one snapshot of tick reads into an order book.
///
/// Invalid configuration, an empty curve or an unresolvable reference all give an empty
/// book; callers tell "no liquidity" apart with `OrderBook::has_liquidity`.
pub fn project_order_book(
    reads: &[TickRead],
    pool: &PoolDescriptor,
    live: &LivePoolState,
    config: &OrderBookConfig,
    units: &LevelUnits,
) -> OrderBook {
    if let Err(e) = config.validate() {
        log::warn!("Skipping projection: {}", e);
        return OrderBook::empty(0);
    }
    let decimals = price_decimals(config.bucket_size);

    let curve = build_pool_curve(reads, pool, live);
    let Some(reference) = locate_reference_tick(&curve, live.current_tick) else {
        log::debug!("No reference tick; curve is empty");
        return OrderBook::empty(decimals);
    };

    let orientation = resolve_orientation(&curve[reference]);
    let aggregated = aggregate_buckets(&curve, reference, orientation, &config.bucket_params());

    log::debug!(
        "Projected {} bids / {} asks around tick {} ({:?})",
        aggregated.bids.len(),
        aggregated.asks.len(),
        curve[reference].tick_index,
        orientation
    );

    OrderBook {
        asks: format_levels(&aggregated.asks, config.bucket_size, units),
        bids: format_levels(&aggregated.bids, config.bucket_size, units),
        last_price: Some(format_price(aggregated.reference_price, config.bucket_size, units)),
        last_price_raw: Some(aggregated.reference_price),
        reference_tick: Some(curve[reference].tick_index),
        orientation: Some(orientation),
        price_decimals: decimals,
    }
}
