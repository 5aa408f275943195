// buckets.rs
// ============================================================================
// Bucket aggregation: the curve around the reference tick -> fixed-depth book sides.
//
// Bids round down (floor) and asks round up (ceil) onto the bucket grid, so a bid never
// shows a better price than it really has and an ask never looks cheaper. Using one
// rounding for both sides would misstate the spread.
//
// Buckets are keyed by an integer grid index (`price / bucket_size`) in a BTreeMap, so
// sums are exact per key and iteration is ascending and deterministic.
//
// Cumulative totals always run from the price nearest the reference outward.
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{BucketLevel, CurveTick, Orientation, Side};

/// Sizes below this are floating noise, not liquidity.
pub const NEGLIGIBLE_SIZE: f64 = 1e-9;

/// Tolerance used when deciding the decimals of a bucket width.
const GRID_SNAP: f64 = 1e-9;

/// Relative gap (a few ULPs) under which `k * bucket_size` counts as equal to the price.
const GRID_RESIDUE: f64 = 4.0 * f64::EPSILON;

/// Largest grid index still exact in f64 (2^53).
const MAX_GRID_INDEX: f64 = 9_007_199_254_740_992.0;

const MAX_PRICE_DECIMALS: f64 = 8.0;

/// What to do with resolved prices outside [0, 1].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFilter {
    /// Aggregate everything; the caller decides how to show out-of-range rows.
    #[default]
    None,
    /// Drop ticks whose resolved price is outside [0, 1] before bucketing.
    UnitInterval,
}

impl PriceFilter {
    fn admits(self, price: f64) -> bool {
        match self {
            PriceFilter::None => true,
            PriceFilter::UnitInterval => (0.0..=1.0).contains(&price),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketParams {
    pub bucket_size: f64,
    pub rows_per_side: usize,
    pub price_filter: PriceFilter,
}

/// Both sides, nearest-to-reference first.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedBook {
    pub bids: Vec<BucketLevel>, // descending price
    pub asks: Vec<BucketLevel>, // ascending price
    pub reference_price: f64,
}

/// Display decimals implied by the bucket width: `clamp(ceil(-log10(w)), 0, 8)` below 1.
pub fn price_decimals(bucket_size: f64) -> u32 {
    if !(bucket_size.is_finite() && bucket_size > 0.0) || bucket_size >= 1.0 {
        return 0;
    }
    // tolerance keeps exact powers of ten (0.1, 0.01) from rounding up a digit
    (-bucket_size.log10() - GRID_SNAP).ceil().clamp(0.0, MAX_PRICE_DECIMALS) as u32
}

/// Grid index for `price` on `side`. `None` when the quotient is not representable.
pub fn bucket_index(price: f64, bucket_size: f64, side: Side) -> Option<i64> {
    let q = price / bucket_size;
    if !q.is_finite() || q.abs() > MAX_GRID_INDEX {
        return None;
    }
    let nearest = q.round();
    // snap only when the grid point reproduces the price up to float residue
    let k = if (nearest * bucket_size - price).abs() <= GRID_RESIDUE * price.abs() {
        nearest
    } else {
        match side {
            Side::Bid => q.floor(),
            Side::Ask => q.ceil(),
        }
    };
    Some(k as i64)
}

/// Price of grid index `k`, with multiplication noise removed.
pub fn bucket_price(k: i64, bucket_size: f64) -> f64 {
    let raw = k as f64 * bucket_size;
    let scale = 10f64.powi(price_decimals(bucket_size) as i32 + 4);
    let snapped = (raw * scale).round() / scale;
    if snapped.is_finite() { snapped } else { raw }
}

/// Aggregate the curve around `reference` into at most `rows_per_side` levels per side.
///
/// Panics if `bucket_size` is not a positive finite number, `rows_per_side` is zero or
/// `reference` is out of bounds; configuration validation upstream rules these out.
pub fn aggregate_buckets(
    curve: &[CurveTick],
    reference: usize,
    orientation: Orientation,
    params: &BucketParams,
) -> AggregatedBook {
    let w = params.bucket_size;
    assert!(w.is_finite() && w > 0.0, "bucket_size must be positive, got {}", w);
    assert!(params.rows_per_side > 0, "rows_per_side must be positive");
    assert!(reference < curve.len(), "reference {} outside curve of {}", reference, curve.len());

    let reference_price = orientation.price(&curve[reference]);
    let below = &curve[..reference];
    let above = &curve[reference + 1..];

    // Resolved price rises with tick index for price0 on a real pool and falls for price1.
    let first = orientation.price(&curve[0]);
    let last = orientation.price(&curve[curve.len() - 1]);
    let (bid_candidates, ask_candidates) = if last >= first { (below, above) } else { (above, below) };

    let bid_buckets = bucket_side(bid_candidates, Side::Bid, orientation, params);
    let ask_buckets = bucket_side(ask_candidates, Side::Ask, orientation, params);

    let asks = ask_buckets
        .iter()
        .map(|(&k, &size)| (bucket_price(k, w), size))
        .filter(|(price, _)| *price >= reference_price)
        .take(params.rows_per_side);
    let bids = bid_buckets
        .iter()
        .rev()
        .map(|(&k, &size)| (bucket_price(k, w), size))
        .filter(|(price, _)| *price <= reference_price)
        .take(params.rows_per_side);

    AggregatedBook {
        bids: accumulate(bids),
        asks: accumulate(asks),
        reference_price,
    }
}

fn bucket_side(
    ticks: &[CurveTick],
    side: Side,
    orientation: Orientation,
    params: &BucketParams,
) -> BTreeMap<i64, f64> {
    let mut buckets: BTreeMap<i64, f64> = BTreeMap::new();
    for tick in ticks {
        let size = orientation.size(tick);
        let price = orientation.price(tick);
        if !size.is_finite() || size < NEGLIGIBLE_SIZE || !price.is_finite() {
            continue;
        }
        if !params.price_filter.admits(price) {
            continue;
        }
        if let Some(k) = bucket_index(price, params.bucket_size, side) {
            *buckets.entry(k).or_insert(0.0) += size;
        }
    }
    buckets
}

fn accumulate(levels: impl Iterator<Item = (f64, f64)>) -> Vec<BucketLevel> {
    let mut total = 0.0;
    levels
        .map(|(price, size)| {
            total += size;
            BucketLevel { price, size, total }
        })
        .collect()
}
