use rocket::serde::json::Json;
use rocket::{get, State};
use std::sync::Arc;

use crate::bootstrap::AppState;
use crate::web::dto::OrderBookResponse;

#[get("/api/v1/orderbook")]
pub async fn orderbook(app_state: &State<Arc<AppState>>) -> Json<OrderBookResponse> {
    let view = app_state.service.snapshot().await;
    if let Some(e) = &view.error {
        log::debug!("Serving errored order book: {}", e);
    }
    Json(OrderBookResponse::from_view(view, app_state.rows_per_side))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
