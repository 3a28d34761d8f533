use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// アプリケーション全体のエラー
///
/// Displayの文字列はそのままユーザーに表示されるメッセージ（韓国語）
#[derive(Error, Debug)]
pub enum AppError {
    /// 呼び出し側の入力が前提条件を満たしていない（空の内容、不正なIDなど）
    #[error("{0}")]
    Validation(String),
    /// 必要な認証情報が設定されていない
    #[error("{0}")]
    Configuration(String),
    /// データストアへの呼び出しが失敗した
    #[error("{0}")]
    DataAccess(String),
    /// AIクライアントから使えるテキストが得られなかった
    #[error("{0}")]
    Generation(String),
    /// 要約の生成には成功したが保存に失敗した
    #[error("{0}")]
    Persistence(String),
    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_)
            | AppError::DataAccess(_)
            | AppError::Generation(_)
            | AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// 本文の読み取り失敗も`{error}`の形で返すJSON抽出器
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => messages::JSON_CONTENT_TYPE_REQUIRED,
            JsonRejection::JsonDataError(_) => messages::INVALID_FIELDS,
            _ => messages::INVALID_BODY,
        };
        AppError::Validation(message.to_string())
    }
}

/// ユーザーに表示するメッセージ
pub mod messages {
    pub const LIST_FAILED: &str = "메모를 불러오는데 실패했습니다.";
    pub const CREATE_FAILED: &str = "메모 생성에 실패했습니다.";
    pub const UPDATE_FAILED: &str = "메모 수정에 실패했습니다.";
    pub const DELETE_FAILED: &str = "메모 삭제에 실패했습니다.";
    pub const SEARCH_FAILED: &str = "메모 검색에 실패했습니다.";
    pub const NOT_FOUND: &str = "메모를 찾을 수 없습니다.";
    pub const INVALID_ID: &str = "잘못된 메모 ID입니다.";
    pub const INVALID_BODY: &str = "요청 본문을 읽을 수 없습니다.";
    pub const INVALID_FIELDS: &str = "요청 본문의 항목이 올바르지 않습니다.";
    pub const JSON_CONTENT_TYPE_REQUIRED: &str = "요청 본문은 JSON이어야 합니다.";

    pub const API_KEY_MISSING: &str = "GEMINI_API_KEY가 설정되지 않았습니다.";
    pub const CONTENT_REQUIRED: &str = "메모 내용이 필요합니다.";
    pub const GENERATION_FAILED: &str = "요약 생성에 실패했습니다.";
    pub const GENERATION_ERROR_PREFIX: &str = "요약 생성 중 오류가 발생했습니다";
    pub const SUMMARY_SAVE_FAILED: &str = "요약 결과를 저장하는데 실패했습니다.";

    /// 要約処理中の失敗に付ける共通の前置き
    pub fn generation_error(detail: impl std::fmt::Display) -> String {
        format!("{}: {}", GENERATION_ERROR_PREFIX, detail)
    }
}
