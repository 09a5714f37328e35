use crate::errors::AppError;
use crate::models::Credentials;
use std::fmt;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_VOIPMS_API_URL: &str = "https://voip.ms/api/v1/rest.php";
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Process-wide configuration, read once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// VoIP.ms account username. Missing values surface as a 500 per request.
    pub voipms_username: Option<String>,
    /// VoIP.ms API password.
    pub voipms_password: Option<String>,
    pub currency: String,
    /// Expected bearer token. `None` runs the gate in open mode.
    pub expected_token: Option<String>,
    pub debug: bool,
    pub voipms_api_url: String,
    pub ip_echo_url: String,
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Logs the loaded configuration without sensitive values.
    pub fn log_summary(&self) {
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("VoIP.ms API URL: {}", self.voipms_api_url);
        tracing::debug!("IP echo URL: {}", self.ip_echo_url);
        tracing::debug!("Currency: {}", self.currency);
        tracing::debug!("Server Port: {}", self.port);
        if self.voipms_username.is_none() || self.voipms_password.is_none() {
            tracing::warn!(
                "VOIPMS_USERNAME or VOIPMS_PASSWORD not set; balance requests will fail with 500"
            );
        }
        if self.expected_token.is_none() {
            tracing::warn!("GROUNDWIRE_TOKEN not set; bearer authentication is disabled");
        }
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            port: non_empty("PORT")
                .map(|port| port.trim().parse::<u16>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?
                .unwrap_or(DEFAULT_PORT),
            voipms_username: non_empty("VOIPMS_USERNAME").map(|user| user.trim().to_string()),
            voipms_password: non_empty("VOIPMS_PASSWORD"),
            currency: non_empty("CURRENCY")
                .map(|currency| currency.trim().to_string())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            expected_token: non_empty("GROUNDWIRE_TOKEN"),
            debug: non_empty("DEBUG").is_some_and(|flag| parse_flag(&flag)),
            voipms_api_url: non_empty("VOIPMS_API_URL")
                .map(|url| validate_http_url("VOIPMS_API_URL", url))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_VOIPMS_API_URL.to_string()),
            ip_echo_url: non_empty("IP_ECHO_URL")
                .map(|url| validate_http_url("IP_ECHO_URL", url))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_IP_ECHO_URL.to_string()),
            upstream_timeout_secs: non_empty("UPSTREAM_TIMEOUT_SECS")
                .map(|secs| secs.trim().parse::<u64>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a positive integer"))?
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        })
    }

    /// Returns the account credentials, or a configuration error when either is missing.
    pub fn credentials(&self) -> Result<Credentials, AppError> {
        match (&self.voipms_username, &self.voipms_password) {
            (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
            _ => Err(AppError::Configuration(
                "VOIPMS_USERNAME and VOIPMS_PASSWORD must be set".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("voipms_username", &self.voipms_username)
            .field(
                "voipms_password",
                &self.voipms_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("currency", &self.currency)
            .field(
                "expected_token",
                &self.expected_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("debug", &self.debug)
            .field("voipms_api_url", &self.voipms_api_url)
            .field("ip_echo_url", &self.ip_echo_url)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn validate_http_url(key: &str, raw: String) -> anyhow::Result<String> {
    let url = raw.trim();
    let parsed =
        url::Url::parse(url).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(url.to_string())
}
