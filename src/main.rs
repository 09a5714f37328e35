use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_groundwire_balance::config::Config;
use rust_groundwire_balance::handlers::{self, AppState};

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, builds the billing clients and
/// starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // The DEBUG toggle raises the default filter; RUST_LOG always wins.
    let default_filter = if config.debug {
        "rust_groundwire_balance=debug,tower_http=debug"
    } else {
        "rust_groundwire_balance=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.log_summary();

    let port = config.port;
    let app_state = Arc::new(AppState::from_config(config)?);
    tracing::info!(
        "✓ VoIP.ms client initialized: {}",
        app_state.config.voipms_api_url
    );

    let app = handlers::router(app_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
