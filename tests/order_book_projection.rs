// tests/order_book_projection.rs
// ===================================
// End-to-end behaviour of the projection core on hand-built curves.

use clmm_orderbook::engine::book::{project_order_book, OrderBookConfig};
use clmm_orderbook::engine::buckets::{aggregate_buckets, bucket_index, bucket_price, BucketParams, PriceFilter};
use clmm_orderbook::engine::format::{format_levels, LevelUnits};
use clmm_orderbook::engine::locator::locate_reference_tick;
use clmm_orderbook::engine::orientation::resolve_orientation;
use clmm_orderbook::engine::tick_range::build_tick_range;
use clmm_orderbook::models::{CurveTick, LivePoolState, Orientation, PoolDescriptor, Side};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn tick(index: i32, price0: f64, size: f64) -> CurveTick {
    CurveTick::new(index, size, size, price0, 1.0 / price0).expect("valid tick")
}

fn params(bucket_size: f64, rows: usize) -> BucketParams {
    BucketParams { bucket_size, rows_per_side: rows, price_filter: PriceFilter::None }
}

/// Ticks -20..20 with price0 falling from 1.10 to 0.90, 100 locked at each.
fn scenario_curve() -> Vec<CurveTick> {
    vec![
        tick(-20, 1.10, 100.0),
        tick(-10, 1.05, 100.0),
        tick(0, 1.00, 100.0),
        tick(10, 0.95, 100.0),
        tick(20, 0.90, 100.0),
    ]
}

#[test]
fn test_worked_scenario_with_price1_orientation() {
    let curve = scenario_curve();
    let reference = locate_reference_tick(&curve, 0).unwrap();
    assert_eq!(curve[reference].tick_index, 0);

    // price1 = 1.00 <= 1, so price1 is shown
    let orientation = resolve_orientation(&curve[reference]);
    assert_eq!(orientation, Orientation::Price1);

    let book = aggregate_buckets(&curve, reference, orientation, &params(0.05, 2));
    assert!(approx(book.reference_price, 1.0));

    // price1 at -10 is 0.9524 -> floor to 0.95; at -20 is 0.9091 -> 0.90
    assert_eq!(book.bids.len(), 2);
    assert!(approx(book.bids[0].price, 0.95) && approx(book.bids[0].total, 100.0));
    assert!(approx(book.bids[1].price, 0.90) && approx(book.bids[1].total, 200.0));

    // price1 at 10 is 1.0526 -> ceil to 1.10; at 20 is 1.1111 -> 1.15
    assert_eq!(book.asks.len(), 2);
    assert!(approx(book.asks[0].price, 1.10) && approx(book.asks[0].total, 100.0));
    assert!(approx(book.asks[1].price, 1.15) && approx(book.asks[1].total, 200.0));

    let asks = format_levels(&book.asks, 0.05, &LevelUnits::default());
    assert_eq!(asks[0].price, "1.10");
    assert_eq!(asks[1].total, "200.00");
}

#[test]
fn test_aggregation_is_deterministic() {
    let curve = scenario_curve();
    let a = aggregate_buckets(&curve, 2, Orientation::Price1, &params(0.05, 8));
    let b = aggregate_buckets(&curve, 2, Orientation::Price1, &params(0.05, 8));
    assert_eq!(a, b);
    for (x, y) in a.asks.iter().zip(&b.asks) {
        assert_eq!(x.price.to_bits(), y.price.to_bits());
        assert_eq!(x.total.to_bits(), y.total.to_bits());
    }
}

#[test]
fn test_sides_stay_on_their_side_of_reference() {
    let prices: Vec<f64> = (0..41).map(|i| 0.40 + i as f64 * 0.0037).collect();
    let curve: Vec<CurveTick> = prices.iter().enumerate().map(|(i, &p)| tick(i as i32, p, 3.0)).collect();
    for reference in [0, 7, 20, 33, 40] {
        let book = aggregate_buckets(&curve, reference, Orientation::Price0, &params(0.01, 6));
        assert!(book.bids.iter().all(|l| l.price <= book.reference_price));
        assert!(book.asks.iter().all(|l| l.price >= book.reference_price));
        assert!(book.bids.len() <= 6 && book.asks.len() <= 6);
    }
}

#[test]
fn test_rounding_direction() {
    let bid = bucket_index(1.2345, 0.01, Side::Bid).unwrap();
    let ask = bucket_index(1.2345, 0.01, Side::Ask).unwrap();
    assert!(approx(bucket_price(bid, 0.01), 1.23));
    assert!(approx(bucket_price(ask, 0.01), 1.24));
}

#[test]
fn test_cumulative_totals_run_from_reference() {
    let curve: Vec<CurveTick> = (0..30).map(|i| tick(i, 0.30 + i as f64 * 0.011, 1.0 + i as f64)).collect();
    let book = aggregate_buckets(&curve, 15, Orientation::Price0, &params(0.02, 5));
    for side in [&book.bids, &book.asks] {
        let mut running = 0.0;
        for level in side.iter() {
            running += level.size;
            assert!(approx(level.total, running));
        }
    }
}

#[test]
fn test_row_cap_holds_with_many_buckets() {
    let curve: Vec<CurveTick> = (0..200).map(|i| tick(i, 0.01 + i as f64 * 0.0049, 1.0)).collect();
    let book = aggregate_buckets(&curve, 100, Orientation::Price0, &params(0.01, 3));
    assert_eq!(book.bids.len(), 3);
    assert_eq!(book.asks.len(), 3);
}

#[test]
fn test_nearest_tick_fallback_prefers_lower_on_tie() {
    let curve: Vec<CurveTick> = [-100, -50, 0, 50, 100].iter().map(|&t| tick(t, 1.0001f64.powi(t), 1.0)).collect();
    assert_eq!(curve[locate_reference_tick(&curve, 37).unwrap()].tick_index, 50);
    assert_eq!(curve[locate_reference_tick(&curve, 25).unwrap()].tick_index, 0);
    assert_eq!(curve[locate_reference_tick(&curve, -1_000).unwrap()].tick_index, -100);
}

#[test]
fn test_empty_window_gives_empty_book() {
    assert!(build_tick_range(100.0, 100.0, 10).is_empty());
    assert!(build_tick_range(200.0, 100.0, 10).is_empty());

    let pool = PoolDescriptor::new(10, 18, 18).unwrap();
    let live = LivePoolState { current_tick: 0, liquidity: None };
    let book = project_order_book(&[], &pool, &live, &OrderBookConfig::new(100, 100), &LevelUnits::default());
    assert!(!book.has_liquidity());
    assert_eq!(book.last_price, None);
}

#[test]
fn test_negligible_liquidity_is_ignored() {
    let curve = vec![
        tick(-10, 0.48, 1e-10),
        tick(0, 0.50, 5.0),
        tick(10, 0.52, 1e-10),
    ];
    let book = aggregate_buckets(&curve, 1, Orientation::Price0, &params(0.01, 4));
    assert!(book.bids.is_empty());
    assert!(book.asks.is_empty());
}

#[test]
fn test_unit_interval_filter_drops_out_of_range_prices() {
    let curve = vec![tick(-10, 0.90, 1.0), tick(0, 0.97, 1.0), tick(10, 1.04, 1.0), tick(20, 1.10, 1.0)];
    let unfiltered = aggregate_buckets(&curve, 1, Orientation::Price0, &params(0.01, 4));
    assert_eq!(unfiltered.asks.len(), 2);

    let filtered = aggregate_buckets(
        &curve,
        1,
        Orientation::Price0,
        &BucketParams { price_filter: PriceFilter::UnitInterval, ..params(0.01, 4) },
    );
    assert!(filtered.asks.is_empty());
    assert_eq!(filtered.bids.len(), 1);
}
