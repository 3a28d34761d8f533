use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result, messages},
    repositories::MemoRepository,
    services::gemini::{SamplingConfig, TextGenerator},
    services::{Collection, InvalidationBus},
};

/// 要約は短く、ほぼ決定的に
pub const SUMMARY_SAMPLING: SamplingConfig = SamplingConfig {
    max_output_tokens: 500,
    temperature: 0.3,
    top_p: 0.9,
    top_k: 40,
};

// プロンプト
const SUMMARY_PROMPT: &str = "다음 메모의 핵심 내용을 3-5개의 간결한 불릿 포인트로 요약해주세요. 요약은 한국어로 작성하고, 주요 포인트만 포함해주세요.";

pub fn build_summary_prompt(content: &str) -> String {
    format!("{}\n\n메모 내용:\n{}", SUMMARY_PROMPT, content)
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub token_count: u64,
}

pub struct SummaryService {
    memo_repo: Arc<dyn MemoRepository>,
    /// APIキーが未設定の場合はNone
    generator: Option<Arc<dyn TextGenerator>>,
    invalidation: InvalidationBus,
    model: String,
}

impl SummaryService {
    pub fn new(
        memo_repo: Arc<dyn MemoRepository>,
        generator: Option<Arc<dyn TextGenerator>>,
        invalidation: InvalidationBus,
        model: String,
    ) -> Self {
        Self {
            memo_repo,
            generator,
            invalidation,
            model,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// メモの内容を要約し、メモに保存する
    ///
    /// 保存に失敗した場合は、生成に成功していても要約は返さない。
    /// 同じメモへの同時呼び出しは調停しないので、最後に保存されたものが残る
    pub async fn summarize_and_save(&self, memo_id: Uuid, content: &str) -> Result<SummaryResult> {
        // 1. 要約の生成。生成と保存の失敗は共通の前置きを付けて返す
        let result = self
            .generate_summary_content(content)
            .await
            .map_err(|e| match e {
                AppError::Generation(msg) if !msg.starts_with(messages::GENERATION_ERROR_PREFIX) => {
                    AppError::Generation(messages::generation_error(msg))
                }
                other => other,
            })?;

        // 2. DBへ保存
        self.memo_repo
            .update_summary(memo_id, &result.summary)
            .await
            .map_err(|e| {
                tracing::error!(%memo_id, error = %e, "Generated summary could not be saved");
                AppError::Persistence(messages::generation_error(messages::SUMMARY_SAVE_FAILED))
            })?;

        tracing::info!(%memo_id, token_count = result.token_count, "Memo summarized");
        self.invalidation.invalidate(Collection::Memos);

        Ok(result)
    }

    /// 要約を生成するだけで保存はしない
    pub async fn generate_summary_content(&self, content: &str) -> Result<SummaryResult> {
        // 外部APIを呼ぶ前に前提条件を確認する
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| AppError::Configuration(messages::API_KEY_MISSING.to_string()))?;

        if content.is_empty() {
            return Err(AppError::Validation(messages::CONTENT_REQUIRED.to_string()));
        }

        let prompt = build_summary_prompt(content);
        let generation = generator
            .generate_content(&self.model, &prompt, &SUMMARY_SAMPLING)
            .await?;

        let summary = generation
            .text
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                tracing::warn!(model = %self.model, "Model returned no summary text");
                AppError::Generation(messages::GENERATION_FAILED.to_string())
            })?;

        Ok(SummaryResult {
            summary,
            token_count: generation.total_token_count.unwrap_or(0),
        })
    }
}
