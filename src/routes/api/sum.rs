//! 旧来の要約エンドポイント。保存は行わない
//!
//! メモの要約は`POST /api/memos/{id}/summary`を使うこと

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue},
    response::Json,
    routing::post,
};
use serde::Deserialize;

use crate::{
    error::{AppJson, Result},
    server::AppState,
    services::SummaryResult,
};

pub fn create_sum_routes() -> Router<AppState> {
    Router::new().route("/summarize", post(summarize_content))
}

#[derive(Deserialize)]
struct SummarizeRequest {
    // 文字列以外は内容なしとして扱う
    #[serde(default)]
    content: serde_json::Value,
}

async fn summarize_content(
    State(state): State<AppState>,
    AppJson(req): AppJson<SummarizeRequest>,
) -> Result<([(HeaderName, HeaderValue); 1], Json<SummaryResult>)> {
    tracing::warn!("Deprecated endpoint /api/summarize called");

    let content = req.content.as_str().unwrap_or_default();
    let result = state
        .summary_service
        .generate_summary_content(content)
        .await?;

    Ok((
        [(
            HeaderName::from_static("deprecation"),
            HeaderValue::from_static("true"),
        )],
        Json(result),
    ))
}
