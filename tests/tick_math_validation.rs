use clmm_orderbook::math::tick_math::*;
use clmm_orderbook::engine::curve::build_pool_curve;
use clmm_orderbook::models::{LivePoolState, PoolDescriptor, RawTickLiquidity, TickRead};
use num_bigint::BigInt;
use num_traits::Zero;

#[test]
fn test_tick_math_against_known_values() {
    println!("=== TICK MATH VALIDATION AGAINST KNOWN UNISWAP VALUES ===");

    // A 62% chance market between two 18-decimal outcome tokens
    let test_price = 0.62;
    let calculated_tick = tick_from_price(test_price, 18, 18);
    let reverse_price = price_from_tick(calculated_tick, 18, 18);

    println!("  Input price: {:.4}", test_price);
    println!("  Calculated tick: {}", calculated_tick);
    println!("  Reverse price: {:.6}", reverse_price);

    // within one tick (1bp)
    let price_error = (reverse_price - test_price).abs() / test_price;
    assert!(price_error < 0.0001, "Round-trip price error too high: {:.6}", price_error);

    // USDC/ETH style decimals shift the human price by 10^12
    let scaled = price_from_tick(calculated_tick, 18, 6);
    assert!((scaled / reverse_price - 1e12).abs() / 1e12 < 1e-9);

    let min_sqrt = get_sqrt_ratio_at_tick(MIN_TICK);
    let max_sqrt = get_sqrt_ratio_at_tick(MAX_TICK);
    assert!(min_sqrt > BigInt::zero(), "MIN_TICK sqrt should be positive");
    assert!(max_sqrt > min_sqrt, "MAX_TICK sqrt should be > MIN_TICK sqrt");
}

#[test]
fn test_clamping_keeps_ticks_representable() {
    assert_eq!(tick_from_price(1e-300, 18, 18), MIN_TICK);
    assert_eq!(tick_from_price(1e300, 18, 18), MAX_TICK);
}

#[test]
fn test_curve_amounts_follow_sqrt_price_math() {
    println!("\n=== CURVE AMOUNTS VS SQRT PRICE MATH ===");

    let l: i128 = 1_000_000_000_000_000_000;
    let reads: Vec<TickRead> = vec![
        Ok(RawTickLiquidity { tick_index: 0, liquidity_gross: l as u128, liquidity_net: l }),
        Ok(RawTickLiquidity { tick_index: 60, liquidity_gross: 0, liquidity_net: 0 }),
        Ok(RawTickLiquidity { tick_index: 120, liquidity_gross: l as u128, liquidity_net: -l }),
    ];
    let pool = PoolDescriptor::new(60, 18, 18).unwrap();
    let curve = build_pool_curve(&reads, &pool, &LivePoolState { current_tick: 30, liquidity: None });

    assert_eq!(curve.len(), 3);
    let sa = get_sqrt_ratio_at_tick(0);
    let sb = get_sqrt_ratio_at_tick(60);
    let expected0 = to_token_amount(&amount0_delta(&sa, &sb, &BigInt::from(l), false), 18);
    let expected1 = to_token_amount(&amount1_delta(&sa, &sb, &BigInt::from(l), false), 18);

    println!("  tick 0 -> token0 {:.8}, token1 {:.8}", curve[0].liquidity_locked_token0, curve[0].liquidity_locked_token1);
    assert!((curve[0].liquidity_locked_token0 - expected0).abs() < 1e-12);
    assert!((curve[0].liquidity_locked_token1 - expected1).abs() < 1e-12);
    assert!((curve[0].price0 * curve[0].price1 - 1.0).abs() < 1e-12);

    // liquidity ends at tick 120
    assert_eq!(curve[2].liquidity_locked_token0, 0.0);
    assert_eq!(curve[2].liquidity_locked_token1, 0.0);
}
