use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity claimed by the caller for a single request.
#[derive(Clone, Default)]
pub struct ClientIdentity {
    /// Raw `User-Agent` value.
    pub signature: Option<String>,
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
}

impl ClientIdentity {
    /// Extracts the identity from request headers. Non-UTF-8 values are treated as absent.
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let read = |name: axum::http::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            signature: read(axum::http::header::USER_AGENT),
            authorization: read(axum::http::header::AUTHORIZATION),
        }
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("signature", &self.signature)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// VoIP.ms account credentials.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Status vocabulary of the VoIP.ms REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamStatus {
    Success,
    IpNotEnabled,
    Other(String),
}

impl From<&str> for UpstreamStatus {
    fn from(status: &str) -> Self {
        match status {
            "success" => UpstreamStatus::Success,
            "ip_not_enabled" => UpstreamStatus::IpNotEnabled,
            other => UpstreamStatus::Other(other.to_string()),
        }
    }
}

/// Body returned by the `getBalance` method.
///
/// Example success body:
/// ```json
/// {"status": "success", "balance": {"current_balance": "15.6700", "spent_total": "2.10"}}
/// ```
///
/// Only `status` is typed strictly; the optional fields are kept as raw JSON so an
/// oddly typed extra never hides the status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResponse {
    pub status: String,
    #[serde(default)]
    pub balance: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl UpstreamResponse {
    pub fn status(&self) -> UpstreamStatus {
        UpstreamStatus::from(self.status.as_str())
    }

    /// The upstream message, when it is a string.
    pub fn message(&self) -> Option<String> {
        self.message
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// `balance.current_balance`: usually a numeric string, occasionally a bare JSON number.
    pub fn current_balance(&self) -> Option<&Value> {
        self.balance.as_ref()?.get("current_balance")
    }
}

/// A finite balance and its two-decimal rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceResult {
    amount: f64,
    formatted: String,
}

impl BalanceResult {
    /// Rounds `value` to two fractional digits. Returns `None` for NaN or infinities.
    pub fn from_amount(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let formatted = format!("{:.2}", value);
        let amount = formatted.parse::<f64>().ok()?;

        Some(Self { amount, formatted })
    }

    /// Parses a numeric-looking upstream value (string or JSON number).
    pub fn parse(raw: &Value) -> Option<Self> {
        let value = match raw {
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Number(n) => n.as_f64()?,
            _ => return None,
        };

        Self::from_amount(value)
    }

    /// The rounded numeric balance.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Always exactly two fractional digits.
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

/// Success payload expected by Groundwire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance_string: String,
    pub balance: f64,
    pub currency: String,
    pub timestamp: String,
}

/// Error envelope returned for every failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
    pub timestamp: String,
}
