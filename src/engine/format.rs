use serde::{Deserialize, Serialize};

use crate::engine::buckets::price_decimals;
use crate::models::{BucketLevel, OrderBookLevel};

/// Unit suffixes and size precision supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUnits {
    pub price_suffix: String,
    pub size_suffix: String,
    pub size_decimals: u32,
}

impl Default for LevelUnits {
    fn default() -> Self {
        Self { price_suffix: String::new(), size_suffix: String::new(), size_decimals: 2 }
    }
}

pub fn format_price(price: f64, bucket_size: f64, units: &LevelUnits) -> String {
    format!("{:.*}{}", price_decimals(bucket_size) as usize, price, units.price_suffix)
}

fn format_size(size: f64, units: &LevelUnits) -> String {
    format!("{:.*}{}", units.size_decimals as usize, size, units.size_suffix)
}

pub fn format_levels(levels: &[BucketLevel], bucket_size: f64, units: &LevelUnits) -> Vec<OrderBookLevel> {
    levels
        .iter()
        .map(|l| OrderBookLevel {
            raw_price: l.price,
            raw_size: l.size,
            raw_total: l.total,
            price: format_price(l.price, bucket_size, units),
            size: format_size(l.size, units),
            total: format_size(l.total, units),
        })
        .collect()
}

/// A row as the ladder shows it; ghost rows are zero-size placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub level: Option<OrderBookLevel>,
    pub is_ghost: bool,
}

/// Pad a side with ghost rows up to `rows_per_side` so the reference price stays centered.
pub fn pad_rows(levels: &[OrderBookLevel], rows_per_side: usize) -> Vec<DisplayRow> {
    let mut rows: Vec<DisplayRow> = levels
        .iter()
        .take(rows_per_side)
        .cloned()
        .map(|level| DisplayRow { level: Some(level), is_ghost: false })
        .collect();
    let ghosts = rows_per_side.saturating_sub(rows.len());
    rows.extend((0..ghosts).map(|_| DisplayRow { level: None, is_ghost: true }));
    rows
}
