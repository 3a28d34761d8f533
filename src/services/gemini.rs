use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, messages};

/// サンプリング設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

/// 生成結果。テキストもトークン数も返ってこないことがある
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: Option<String>,
    pub total_token_count: Option<u64>,
}

/// テキスト生成APIの抽象
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<Generation>;
}

//// リクエスト
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl From<&SamplingConfig> for GenerationConfig {
    fn from(c: &SamplingConfig) -> Self {
        Self {
            max_output_tokens: c.max_output_tokens,
            temperature: c.temperature,
            top_p: c.top_p,
            top_k: c.top_k,
        }
    }
}

//// レスポンス
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u64>,
}

impl From<GenerateContentResponse> for Generation {
    fn from(response: GenerateContentResponse) -> Self {
        // 最初の候補のテキストパートを連結する
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty());

        Generation {
            text,
            total_token_count: response.usage_metadata.and_then(|u| u.total_token_count),
        }
    }
}

/// Gemini API クライアント
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

fn generation_error(detail: impl std::fmt::Display) -> AppError {
    AppError::Generation(messages::generation_error(detail))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<Generation> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: config.into(),
        };

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to send Gemini request");
                generation_error(e)
            })?;

        // ステータスコードチェック
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Gemini API returned an error");
            return Err(generation_error(format!("status={}", status)));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gemini response");
            generation_error(e)
        })?;

        Ok(body.into())
    }
}
