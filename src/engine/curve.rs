// curve.rs
//
// Raw per-tick liquidity deltas -> ascending curve of locked token amounts and prices.
//
// Active liquidity is rebuilt by walking initialized ticks upward and applying liquidityNet,
// the same crossing rule the swap simulator uses. When the live pool state carries its active
// liquidity, the whole curve is shifted so the range holding the current tick matches it;
// this accounts for positions that opened below the queried window.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::math::tick_math::{
    amount0_delta, amount1_delta, get_sqrt_ratio_at_tick, price_from_tick, to_token_amount, MAX_TICK,
    MIN_TICK,
};
use crate::models::{CurveTick, LivePoolState, PoolDescriptor, RawTickLiquidity, TickRead};

/// Build the curve for one pass. Failed reads are skipped; the output is sorted by tick.
pub fn build_pool_curve(reads: &[TickRead], pool: &PoolDescriptor, live: &LivePoolState) -> Vec<CurveTick> {
    let mut raw: Vec<RawTickLiquidity> = reads.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    let failed = reads.len() - raw.len();
    if failed > 0 {
        log::debug!("Skipping {} failed tick reads out of {}", failed, reads.len());
    }

    raw.retain(|t| (MIN_TICK..=MAX_TICK).contains(&t.tick_index));
    raw.sort_by_key(|t| t.tick_index);
    raw.dedup_by_key(|t| t.tick_index);

    let liquidity = active_liquidity_per_tick(&raw, live);

    let curve: Vec<CurveTick> = raw
        .iter()
        .zip(liquidity.iter())
        .filter_map(|(t, l)| curve_tick(t.tick_index, l, pool))
        .collect();

    log::debug!("Built curve with {} ticks (spacing {})", curve.len(), pool.tick_spacing);
    curve
}

/// Liquidity active in `[tick, next)` for each raw tick, clamped at zero.
fn active_liquidity_per_tick(raw: &[RawTickLiquidity], live: &LivePoolState) -> Vec<BigInt> {
    let mut running = BigInt::zero();
    let mut cumulative = Vec::with_capacity(raw.len());
    for t in raw {
        running += BigInt::from(t.liquidity_net);
        cumulative.push(running.clone());
    }

    let offset = match live.liquidity {
        Some(active) => {
            // Range holding the current tick: last initialized tick at or below it.
            let at_current = raw
                .iter()
                .rposition(|t| t.tick_index <= live.current_tick)
                .map(|i| cumulative[i].clone())
                .unwrap_or_else(BigInt::zero);
            BigInt::from(active) - at_current
        }
        None => BigInt::zero(),
    };

    cumulative
        .into_iter()
        .map(|l| {
            let shifted = l + &offset;
            if shifted.is_negative() { BigInt::zero() } else { shifted }
        })
        .collect()
}

fn curve_tick(tick: i32, liquidity: &BigInt, pool: &PoolDescriptor) -> Option<CurveTick> {
    let upper = tick.saturating_add(pool.tick_spacing).min(MAX_TICK);
    let sa = get_sqrt_ratio_at_tick(tick);
    let sb = get_sqrt_ratio_at_tick(upper);

    let locked0 = to_token_amount(&amount0_delta(&sa, &sb, liquidity, false), pool.token0_decimals);
    let locked1 = to_token_amount(&amount1_delta(&sa, &sb, liquidity, false), pool.token1_decimals);

    let price0 = price_from_tick(tick, pool.token0_decimals, pool.token1_decimals);
    let price1 = if price0 > 0.0 { 1.0 / price0 } else { f64::INFINITY };

    CurveTick::new(tick, locked0, locked1, price0, price1)
}
