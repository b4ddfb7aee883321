//! Market data endpoint

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use persona_core::market::{StockQuote, parse_symbols};
use serde::Deserialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/stock", get(get_stock))
}

#[derive(Debug, Default, Deserialize)]
pub struct StockParams {
    pub symbols: Option<String>,
}

/// GET /api/stock?symbols=005930,000660 - never fails; falls back to mock
/// data instead
async fn get_stock(
    State(state): State<AppState>,
    Query(params): Query<StockParams>,
) -> Json<StockQuote> {
    let symbols = parse_symbols(params.symbols.as_deref());
    Json(state.market.quote(&symbols).await)
}
