use crate::errors::AppError;
use crate::ip_resolver::IpResolver;
use crate::models::{BalanceResult, Credentials, UpstreamResponse, UpstreamStatus};
use serde_json::Value;
use std::time::Duration;

const BALANCE_METHOD: &str = "getBalance";
const DEFAULT_PERMISSION_MESSAGE: &str = "IP address not enabled for API access";
const DEFAULT_UPSTREAM_MESSAGE: &str = "Unknown API error";

/// Client for the VoIP.ms REST API `getBalance` method.
#[derive(Clone)]
pub struct VoipMsClient {
    client: reqwest::Client,
    api_url: String,
    ip_resolver: IpResolver,
}

impl VoipMsClient {
    /// Creates a new `VoipMsClient`.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Full URL of the REST endpoint (`.../api/v1/rest.php`).
    /// * `timeout` - Upper bound on a single billing call.
    /// * `ip_resolver` - Used to report our address on `ip_not_enabled`.
    pub fn new(api_url: String, timeout: Duration, ip_resolver: IpResolver) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create VoIP.ms client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            ip_resolver,
        })
    }

    /// Fetches the current account balance.
    ///
    /// # Returns
    ///
    /// * `Result<BalanceResult, AppError>` - The balance rounded to two decimals, or the
    ///   classified failure.
    pub async fn fetch_balance(&self, credentials: &Credentials) -> Result<BalanceResult, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &self.api_url,
            &[
                ("content_type", "json"),
                ("api_username", credentials.username()),
                ("api_password", credentials.password()),
                ("method", BALANCE_METHOD),
            ],
        )
        .map_err(|e| AppError::Transport(format!("Failed to build VoIP.ms URL: {}", e)))?;

        tracing::info!("Fetching balance from VoIP.ms for {}", credentials.username());
        // Redact password from logs to prevent credential exposure
        tracing::debug!(
            "VoIP.ms URL: {}?content_type=json&api_username={}&api_password=[REDACTED]&method={}",
            self.api_url,
            credentials.username(),
            BALANCE_METHOD
        );

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("VoIP.ms returned HTTP {}", status);
            return Err(AppError::Transport(format!(
                "VoIP.ms returned HTTP {}",
                status
            )));
        }

        let text = response.text().await.map_err(|e| {
            AppError::Transport(format!(
                "Failed to read VoIP.ms response (HTTP {}): {}",
                status,
                e.without_url()
            ))
        })?;
        tracing::debug!("VoIP.ms response: {}", text);

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            AppError::MalformedResponse(format!("VoIP.ms response is not JSON: {}", e))
        })?;

        let upstream = validate_response(body)?;

        match upstream.status() {
            UpstreamStatus::Success => {
                let balance = extract_balance(&upstream)?;
                tracing::info!("✓ Balance retrieved: {}", balance.formatted());
                Ok(balance)
            }
            UpstreamStatus::IpNotEnabled => {
                tracing::warn!("VoIP.ms rejected our source address (ip_not_enabled)");
                let ip = self.ip_resolver.resolve_own_address().await;
                Err(AppError::UpstreamPermission {
                    message: upstream
                        .message()
                        .unwrap_or_else(|| DEFAULT_PERMISSION_MESSAGE.to_string()),
                    ip,
                })
            }
            UpstreamStatus::Other(status) => {
                tracing::warn!("VoIP.ms returned status '{}'", status);
                Err(AppError::Upstream {
                    message: upstream
                        .message()
                        .unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string()),
                    status,
                })
            }
        }
    }
}

/// Single gate every body passes before its status is looked at: it must be an
/// object carrying a string `status`.
pub fn validate_response(body: Value) -> Result<UpstreamResponse, AppError> {
    let has_status = body
        .as_object()
        .and_then(|obj| obj.get("status"))
        .is_some_and(Value::is_string);

    if !has_status {
        return Err(AppError::MalformedResponse(
            "VoIP.ms response is not an object with a status field".to_string(),
        ));
    }

    serde_json::from_value(body).map_err(|e| {
        AppError::MalformedResponse(format!("Unexpected VoIP.ms response shape: {}", e))
    })
}

/// Pulls `balance.current_balance` out of a success body.
pub fn extract_balance(upstream: &UpstreamResponse) -> Result<BalanceResult, AppError> {
    let raw = upstream.current_balance().ok_or_else(|| {
        AppError::MalformedResponse("Missing balance.current_balance".to_string())
    })?;

    BalanceResult::parse(raw).ok_or_else(|| {
        AppError::MalformedResponse(format!("Balance is not a finite number: {}", raw))
    })
}
