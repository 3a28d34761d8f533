use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppJson, Result, messages},
    repositories::{Memo, MemoForm, MemoList},
    server::AppState,
    services::SummaryResult,
};

pub fn create_memo_routes() -> Router<AppState> {
    Router::new()
        .route("/memos", get(list_memos).post(create_memo))
        .route("/memos/search", get(search_memos))
        .route(
            "/memos/{id}",
            get(get_memo).put(update_memo).delete(delete_memo),
        )
        .route("/memos/{id}/summary", post(summarize_memo))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Deserialize)]
struct SummarizeRequest {
    #[serde(default)]
    content: Option<String>,
}

fn parse_memo_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation(messages::INVALID_ID.to_string()))
}

// qが指定されていれば検索、なければ一覧
async fn list_memos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<MemoList>> {
    let memos = match params.q.as_deref() {
        Some(q) if !q.is_empty() => state.memo_service.search(q).await?,
        _ => state.memo_service.list().await?,
    };
    Ok(Json(MemoList { memos }))
}

async fn search_memos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<MemoList>> {
    let query = params.q.unwrap_or_default();
    let memos = state.memo_service.search(&query).await?;
    Ok(Json(MemoList { memos }))
}

async fn create_memo(
    State(state): State<AppState>,
    AppJson(form): AppJson<MemoForm>,
) -> Result<(StatusCode, Json<Memo>)> {
    let memo = state.memo_service.create(form).await?;
    Ok((StatusCode::CREATED, Json(memo)))
}

async fn get_memo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Memo>> {
    let id = parse_memo_id(&id)?;
    let memo = state.memo_service.find_by_id(id).await?;
    Ok(Json(memo))
}

async fn update_memo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(form): AppJson<MemoForm>,
) -> Result<Json<Memo>> {
    let id = parse_memo_id(&id)?;
    let memo = state.memo_service.update(id, form).await?;
    Ok(Json(memo))
}

async fn delete_memo(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_memo_id(&id)?;
    state.memo_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn summarize_memo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<SummarizeRequest>,
) -> Result<Json<SummaryResult>> {
    let id = parse_memo_id(&id)?;
    let content = req.content.unwrap_or_default();
    let result = state.summary_service.summarize_and_save(id, &content).await?;
    Ok(Json(result))
}
