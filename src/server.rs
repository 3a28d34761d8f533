use axum::{Router, http::Method, http::header::CONTENT_TYPE};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{GeminiConfig, ServerConfig};
use crate::repositories::MemoRepository;
use crate::routes::create_api_routes;
use crate::services::{GeminiClient, InvalidationBus, MemoService, SummaryService, TextGenerator};

/// アプリケーション全体で共有される状態
#[derive(Clone)]
pub struct AppState {
    /// サービス層
    pub memo_service: Arc<MemoService>,
    pub summary_service: Arc<SummaryService>,
    /// ビュー無効化の通知
    pub invalidation: InvalidationBus,
}

impl AppState {
    pub fn new(
        memo_repo: Arc<dyn MemoRepository>,
        generator: Option<Arc<dyn TextGenerator>>,
        model: String,
    ) -> Self {
        let invalidation = InvalidationBus::default();
        Self {
            memo_service: Arc::new(MemoService::new(memo_repo.clone(), invalidation.clone())),
            summary_service: Arc::new(SummaryService::new(
                memo_repo,
                generator,
                invalidation.clone(),
                model,
            )),
            invalidation,
        }
    }

    /// 設定からAIクライアントを組み立てる。APIキーがなければ要約は無効
    pub fn from_config(memo_repo: Arc<dyn MemoRepository>, gemini: &GeminiConfig) -> Self {
        let generator: Option<Arc<dyn TextGenerator>> = if gemini.has_credential() {
            Some(Arc::new(GeminiClient::new(
                gemini.api_key.clone(),
                gemini.base_url.clone(),
            )))
        } else {
            tracing::warn!("GEMINI_API_KEY is not set; summarization is disabled");
            None
        };

        Self::new(memo_repo, generator, gemini.model.clone())
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_routes())
        .with_state(state)
}

pub async fn start_server(
    addr: SocketAddr,
    server_config: &ServerConfig,
    state: AppState,
) -> anyhow::Result<()> {
    tracing::info!("Configuring CORS...");
    let cors = CorsLayer::new()
        .allow_origin(server_config.get_allowed_origins(&addr)?)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server is running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
