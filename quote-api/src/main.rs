use quote_api::{app, AppState};
use quote_store::{app_config::Config, PriceListFeed};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_api=debug,quote_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting quote desk on port {}", config.server.port);

    let feed = PriceListFeed::new(config.price_list.source.clone())?;
    tracing::info!(
        "Price list source: {} (cached for {}s)",
        config.price_list.source,
        config.price_list.cache_ttl_seconds
    );

    let app_state = AppState::new(&config, Arc::new(feed));

    // Warm the cache; a failure here is reported to users on first access instead
    if let Err(err) = app_state.price_list.records().await {
        tracing::warn!("Initial price list load failed: {}", err);
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
