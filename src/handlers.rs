use crate::auth;
use crate::balance_client::VoipMsClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::formatter;
use crate::ip_resolver::IpResolver;
use crate::models::{BalanceResult, ClientIdentity};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Requests carry no body; anything larger than this is refused outright.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Shared application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the VoIP.ms billing API.
    pub voipms_client: VoipMsClient,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let ip_resolver = IpResolver::new(config.ip_echo_url.clone())?;
        let voipms_client = VoipMsClient::new(
            config.voipms_api_url.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
            ip_resolver,
        )?;

        Ok(Self {
            config,
            voipms_client,
        })
    }
}

/// Builds the HTTP application with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", any(get_balance))
        .route("/balance", any(get_balance))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint.
///
/// Returns the service status and version. Not gated.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// ANY /balance
///
/// Balance endpoint polled by Groundwire. Accepts any method and ignores the body.
pub async fn get_balance(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let identity = ClientIdentity::from_headers(&headers);
    if state.config.debug {
        tracing::debug!("Incoming balance request: {:?}", identity);
    }

    match process_balance_request(&state, &identity).await {
        Ok(balance) => {
            tracing::info!(
                "Returning balance {} {}",
                state.config.currency,
                balance.formatted()
            );
            formatter::success(&balance, &state.config.currency)
        }
        Err(e) => e.into_response(),
    }
}

/// Gate, configuration check, then exactly one billing lookup.
pub async fn process_balance_request(
    state: &AppState,
    identity: &ClientIdentity,
) -> Result<BalanceResult, AppError> {
    // 1. Client signature and optional bearer token
    auth::admit(
        identity.signature.as_deref(),
        identity.authorization.as_deref(),
        state.config.expected_token.as_deref(),
    )?;

    // 2. Account credentials must be configured
    let credentials = state.config.credentials()?;

    // 3. Billing lookup
    state.voipms_client.fetch_balance(&credentials).await
}
