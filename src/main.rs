use std::sync::Arc;
use std::time::Duration;

use aesthetica::{http, Config, Controller, GeminiClient, HttpStorage, SideChannel};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aesthetica=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let analyzer = GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
        config.base_url.clone(),
        config.score_policy,
    );

    let side_channel = match &config.storage_url {
        Some(url) => {
            info!(%url, "archiving uploads to storage endpoint");
            SideChannel::new(Arc::new(HttpStorage::new(url.clone())))
        }
        None => SideChannel::disabled(),
    };

    let controller = Arc::new(
        Controller::new(Arc::new(analyzer), side_channel, config.max_upload_bytes)
            .with_session_ttl(config.session_ttl),
    );
    // Sweep a few times per TTL so idle sessions do not linger much past it.
    controller.spawn_sweeper((config.session_ttl / 4).max(Duration::from_secs(1)));
    let app = http::router(controller);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!(
        addr = %config.bind,
        model = %config.model,
        score_policy = ?config.score_policy,
        session_ttl = ?config.session_ttl,
        "server running"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
