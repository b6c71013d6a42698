use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pharmacy_locator::{config::AppConfig, config::database::create_pool, create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO; override with RUST_LOG for debugging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "pharmacy_locator=info,tower_http=info,sqlx=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to Postgres")?;

    let state = AppState::from_pool(pool, &config.search);
    tracing::info!(result_limit = config.search.result_limit, "Availability search configured");

    let app = create_app(state, &config.cors_origins);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Starting pharmacy locator on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
