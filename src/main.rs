use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod repositories;
mod routes;
mod server;
mod services;

use crate::config::Config;
use crate::repositories::PostgresMemoRepository;
use crate::server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    logging::init_logging(&config.logging);
    tracing::info!("Starting Memo Server...");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Failed to parse SocketAddr")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let memo_repo = Arc::new(PostgresMemoRepository::new(pool));
    let state = AppState::from_config(memo_repo, &config.gemini);

    server::start_server(addr, &config.server, state).await
}
