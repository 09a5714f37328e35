use crate::errors::AppError;
use std::time::Duration;

/// Returned whenever the address lookup fails.
pub const UNKNOWN_ADDRESS: &str = "unknown";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Looks up this service's public outbound address.
///
/// Only used to enrich the `ip_not_enabled` failure so the operator knows which
/// address to whitelist in the VoIP.ms portal.
#[derive(Clone)]
pub struct IpResolver {
    client: reqwest::Client,
    echo_url: String,
}

impl IpResolver {
    pub fn new(echo_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create IP echo client: {}", e)))?;

        Ok(Self { client, echo_url })
    }

    /// Returns the trimmed echo body, or [`UNKNOWN_ADDRESS`] on any failure. Never errors.
    pub async fn resolve_own_address(&self) -> String {
        match self.lookup().await {
            Ok(ip) => {
                tracing::debug!("Resolved outbound address: {}", ip);
                ip
            }
            Err(reason) => {
                tracing::warn!("Could not resolve outbound address: {}", reason);
                UNKNOWN_ADDRESS.to_string()
            }
        }
    }

    async fn lookup(&self) -> Result<String, String> {
        let response = self
            .client
            .get(&self.echo_url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("echo service returned {}", response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("unreadable body: {}", e))?;

        let ip = body.trim();
        if ip.is_empty() {
            return Err("empty body".to_string());
        }

        Ok(ip.to_string())
    }
}
