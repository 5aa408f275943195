use rocket::serde::Serialize;

use crate::engine::format::{pad_rows, DisplayRow};
use crate::engine::service::OrderBookView;
use crate::models::OrderBookLevel;

#[derive(Serialize)]
pub struct OrderBookResponse {
    pub timestamp_utc: String,
    pub asks: Vec<OrderBookLevel>,      // ascending from the reference
    pub bids: Vec<OrderBookLevel>,      // descending from the reference
    pub ask_rows: Vec<DisplayRow>,      // ladder order: farthest ask first, ghost-padded
    pub bid_rows: Vec<DisplayRow>,      // ladder order: nearest bid first, ghost-padded
    pub last_price: Option<String>,
    pub last_price_raw: Option<f64>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
}

impl OrderBookResponse {
    pub fn from_view(view: OrderBookView, rows_per_side: usize) -> Self {
        let mut ask_rows = pad_rows(&view.asks, rows_per_side);
        ask_rows.reverse();
        let bid_rows = pad_rows(&view.bids, rows_per_side);

        OrderBookResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            asks: view.asks,
            bids: view.bids,
            ask_rows,
            bid_rows,
            last_price: view.last_price,
            last_price_raw: view.last_price_raw,
            is_loading: view.is_loading,
            is_error: view.is_error,
            error: view.error,
        }
    }
}
