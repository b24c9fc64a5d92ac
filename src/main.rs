use std::sync::Arc;

use anyhow::Context;

use moodmate_api::config::Config;
use moodmate_api::services::insights::InsightClient;
use moodmate_api::{app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodmate_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let store = db::connect(&config.database_url).await?;

    let state = AppState {
        store,
        config: config.clone(),
        insights: InsightClient::new(reqwest::Client::new()),
    };

    let addr = config.listen_addr();
    tracing::info!(addr = %addr, env = ?config.app_env, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
