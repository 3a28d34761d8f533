use axum::{Router, extract::State, response::Json, routing::get};
use serde_json::json;

use crate::server::AppState;

mod events;
mod memo;
mod sum;

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .merge(memo::create_memo_routes())
        .merge(sum::create_sum_routes())
        .merge(events::create_event_routes())
        .route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "summarization": state.summary_service.is_enabled(),
    }))
}
