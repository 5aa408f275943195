// Exact Uniswap v3/v4 tick math for the order-book projection
// ------------------------------------------------------------
// Notes:
// - Q64.96 sqrt ratios are computed with BigInt end-to-end, mirroring TickMath and
//   SqrtPriceMath so per-tick token amounts match what the pool would actually pay out.
// - Human prices are token1 per token0, scaled by decimals. `price1` is the reciprocal.
// - Everything here is pure; callers clamp ticks into [MIN_TICK, MAX_TICK] first.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;
const Q96_U128: u128 = 1u128 << 96;

// --------------------------------- Helpers ---------------------------------

#[inline]
fn bu128(v: u128) -> BigInt { BigInt::from(v) }

#[inline]
fn ordered(a: &BigInt, b: &BigInt) -> (BigInt, BigInt) {
    if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
}

// -------------------------------- Tick Math --------------------------------

/// TickMath.getSqrtRatioAtTick (Q64.96 integer).
pub fn get_sqrt_ratio_at_tick(tick: i32) -> BigInt {
    assert!((MIN_TICK..=MAX_TICK).contains(&tick), "tick out of range");
    let abs_tick = tick.unsigned_abs();

    // ratio is Q128.128
    let mut ratio = if abs_tick & 0x1 != 0 {
        hex_const("fffcb933bd6fad37aa2d162d1a594001")
    } else {
        BigInt::one() << 128
    };

    const STEPS: [(u32, &str); 19] = [
        (0x2, "fff97272373d413259a46990580e213a"),
        (0x4, "fff2e50f5f656932ef12357cf3c7fdcc"),
        (0x8, "ffe5caca7e10e4e61c3624eaa0941cd0"),
        (0x10, "ffcb9843d60f6159c9db58835c926644"),
        (0x20, "ff973b41fa98c081472e6896dfb254c0"),
        (0x40, "ff2ea16466c96a3843ec78b326b52861"),
        (0x80, "fe5dee046a99a2a811c461f1969c3053"),
        (0x100, "fcbe86c7900a88aedcffc83b479aa3a4"),
        (0x200, "f987a7253ac413176f2b074cf7815e54"),
        (0x400, "f3392b0822b70005940c7a398e4b70f3"),
        (0x800, "e7159475a2c29b7443b29c7fa6e889d9"),
        (0x1000, "d097f3bdfd2022b8845ad8f792aa5825"),
        (0x2000, "a9f746462d870fdf8a65dc1f90e061e5"),
        (0x4000, "70d869a156d2a1b890bb3df62baf32f7"),
        (0x8000, "31be135f97d08fd981231505542fcfa6"),
        (0x10000, "09aa508b5b7a84e1c677de54f3e99bc9"),
        (0x20000, "05d6af8dedb81196699c329225ee604"),
        (0x40000, "2216e584f5fa1ea926041bedfe98"),
        (0x80000, "48a170391f7dc42444e8fa2"),
    ];

    for (mask, hex) in STEPS {
        if abs_tick & mask != 0 {
            ratio = (&ratio * hex_const(hex)) >> 128;
        }
    }

    if tick > 0 {
        let max = (BigInt::one() << 256) - 1;
        ratio = max / ratio;
    }
    // round-up shift by 32 (Q128.128 -> Q64.96)
    (&ratio + ((BigInt::one() << 32) - 1)) >> 32
}

fn hex_const(hex: &str) -> BigInt {
    BigInt::parse_bytes(hex.as_bytes(), 16).expect("Failed to parse BigInt constant")
}

// --------------------------- SqrtPriceMath deltas ---------------------------

/// amount0 = L * (sb - sa) / (sb * sa), in Q96, Uniswap two-step rounding.
pub fn amount0_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> BigInt {
    if liquidity.is_zero() { return BigInt::zero(); }
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sa.is_zero() || sa == sb { return BigInt::zero(); }

    let numerator1 = liquidity << 96;
    let numerator2 = &sb - &sa;

    if round_up {
        let t = ceil_div(&(&numerator1 * &numerator2), &sb);
        ceil_div(&t, &sa)
    } else {
        ((&numerator1 * &numerator2) / &sb) / &sa
    }
}

/// amount1 = L * (sb - sa) / Q96
pub fn amount1_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> BigInt {
    if liquidity.is_zero() { return BigInt::zero(); }
    let (sa, sb) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sa == sb { return BigInt::zero(); }

    let num = liquidity * (sb - sa);
    let den = bu128(Q96_U128);
    if round_up { ceil_div(&num, &den) } else { num / den }
}

#[inline]
fn ceil_div(a: &BigInt, b: &BigInt) -> BigInt {
    // assumes a>=0, b>0
    if a.is_zero() { return BigInt::zero(); }
    (a + (b - BigInt::one())) / b
}

// ------------------------------ Human units ------------------------------

/// Raw token units -> human amount (lossy).
pub fn to_token_amount(raw: &BigInt, decimals: u8) -> f64 {
    raw.to_f64().unwrap_or(0.0) / 10f64.powi(decimals as i32)
}

/// Human price (token1 per token0) at the lower edge of `tick`.
pub fn price_from_tick(tick: i32, dec0: u8, dec1: u8) -> f64 {
    let s = get_sqrt_ratio_at_tick(tick).to_f64().unwrap_or(0.0) / (Q96_U128 as f64);
    let price_raw = s * s;
    price_raw * 10f64.powi(dec0 as i32 - dec1 as i32)
}

/// Inverse of `price_from_tick`, floored onto the tick grid.
pub fn tick_from_price(price_1_for_0: f64, dec0: u8, dec1: u8) -> i32 {
    let price_raw = price_1_for_0 * 10f64.powi(dec1 as i32 - dec0 as i32);
    let t = (price_raw.ln() / 1.0001f64.ln()).floor() as i32;
    t.clamp(MIN_TICK, MAX_TICK)
}
