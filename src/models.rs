use serde::{Deserialize, Serialize};

use crate::error::TickFetchError;

/// Static facts about the pool the book is projected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    pub tick_spacing: i32,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
}

impl PoolDescriptor {
    /// Returns `None` for a non-positive tick spacing.
    pub fn new(tick_spacing: i32, token0_decimals: u8, token1_decimals: u8) -> Option<Self> {
        if tick_spacing <= 0 {
            return None;
        }
        Some(Self { tick_spacing, token0_decimals, token1_decimals })
    }
}

/// Live slot0 snapshot. `liquidity` is the pool's active liquidity when the reader has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePoolState {
    pub current_tick: i32,
    pub liquidity: Option<u128>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTickLiquidity {
    pub tick_index: i32,
    pub liquidity_gross: u128,
    pub liquidity_net: i128, // signed delta applied when price crosses upward
}

/// One entry of a tick batch read.
pub type TickRead = Result<RawTickLiquidity, TickFetchError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveTick {
    pub tick_index: i32,
    pub liquidity_locked_token0: f64,
    pub liquidity_locked_token1: f64,
    pub price0: f64, // token1 per token0
    pub price1: f64, // token0 per token1
}

impl CurveTick {
    /// Rejects non-finite values, negative amounts and non-positive prices.
    pub fn new(
        tick_index: i32,
        liquidity_locked_token0: f64,
        liquidity_locked_token1: f64,
        price0: f64,
        price1: f64,
    ) -> Option<Self> {
        let amounts_ok = [liquidity_locked_token0, liquidity_locked_token1]
            .iter()
            .all(|a| a.is_finite() && *a >= 0.0);
        let prices_ok = [price0, price1].iter().all(|p| p.is_finite() && *p > 0.0);
        if !amounts_ok || !prices_ok {
            return None;
        }
        Some(Self { tick_index, liquidity_locked_token0, liquidity_locked_token1, price0, price1 })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side { Bid, Ask }

/// Which of the two reciprocal prices is shown and bucketed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation { Price0, Price1 }

impl Orientation {
    #[inline]
    pub fn price(self, tick: &CurveTick) -> f64 {
        match self {
            Orientation::Price0 => tick.price0,
            Orientation::Price1 => tick.price1,
        }
    }

    #[inline]
    pub fn size(self, tick: &CurveTick) -> f64 {
        match self {
            Orientation::Price0 => tick.liquidity_locked_token0,
            Orientation::Price1 => tick.liquidity_locked_token1,
        }
    }
}

/// Numeric output of the bucket aggregator, one per selected bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketLevel {
    pub price: f64,
    pub size: f64,
    pub total: f64, // cumulative from the reference price outward
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookLevel {
    pub raw_price: f64,
    pub raw_size: f64,
    pub raw_total: f64,
    pub price: String,
    pub size: String,
    pub total: String,
}

impl OrderBookLevel {
    /// Whether the level reads as a probability. Callers use this to mark rows non-interactive.
    pub fn in_unit_range(&self) -> bool {
        (0.0..=1.0).contains(&self.raw_price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBook {
    pub asks: Vec<OrderBookLevel>, // nearest first (ascending)
    pub bids: Vec<OrderBookLevel>, // nearest first (descending)
    pub last_price: Option<String>,
    pub last_price_raw: Option<f64>,
    pub reference_tick: Option<i32>,
    pub orientation: Option<Orientation>,
    pub price_decimals: u32,
}

impl OrderBook {
    pub fn empty(price_decimals: u32) -> Self {
        Self {
            asks: Vec::new(),
            bids: Vec::new(),
            last_price: None,
            last_price_raw: None,
            reference_tick: None,
            orientation: None,
            price_decimals,
        }
    }

    /// False when the projection legitimately produced no levels.
    pub fn has_liquidity(&self) -> bool {
        !self.asks.is_empty() || !self.bids.is_empty()
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.raw_price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.raw_price)
    }

    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    pub fn mid_price(&self) -> Option<f64> {
        Some((self.best_ask()? + self.best_bid()?) / 2.0)
    }

    /// Asks in display order: highest price at the top, nearest to the reference last.
    pub fn asks_top_down(&self) -> impl Iterator<Item = &OrderBookLevel> {
        self.asks.iter().rev()
    }
}
