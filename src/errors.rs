use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_AUTH_REQUIRED: &str = "Authentication required";
pub const MSG_CONFIGURATION: &str = "Server configuration error";
pub const MSG_INVALID_DATA: &str = "Invalid data received from API";
pub const MSG_UNAVAILABLE: &str = "Service temporarily unavailable";

/// Every way a balance request can fail.
///
/// The variant is chosen where the failure happens; the HTTP status and the
/// user-facing message are derived from it and never from message text.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Caller failed the signature or bearer check. Holds the user-facing message.
    Unauthorized(String),
    /// Required account configuration is missing.
    Configuration(String),
    /// The billing API refused the adapter's source address.
    UpstreamPermission {
        /// Message reported by the billing API.
        message: String,
        /// Our outbound address, or `"unknown"`.
        ip: String,
    },
    /// The billing API answered with something we cannot interpret.
    MalformedResponse(String),
    /// Network failure or non-2xx status from the billing API.
    Transport(String),
    /// Any other status reported by the billing API.
    Upstream {
        status: String,
        message: String,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamPermission { .. } => StatusCode::FORBIDDEN,
            AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Transport(_) | AppError::Upstream { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message placed in the error envelope.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Configuration(_) => MSG_CONFIGURATION.to_string(),
            AppError::UpstreamPermission { message, ip } => {
                format!("IP not permitted: {} (source address: {})", message, ip)
            }
            AppError::MalformedResponse(_) => MSG_INVALID_DATA.to_string(),
            AppError::Transport(_) | AppError::Upstream { .. } => MSG_UNAVAILABLE.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::UpstreamPermission { message, ip } => {
                write!(f, "Upstream permission error: {} (ip: {})", message, ip)
            }
            AppError::MalformedResponse(msg) => write!(f, "Malformed upstream response: {}", msg),
            AppError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppError::Upstream { status, message } => {
                write!(f, "Upstream error [{}]: {}", status, message)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Logs the failure according to its severity and renders the error envelope.
    fn into_response(self) -> Response {
        match &self {
            AppError::Unauthorized(_) => tracing::warn!("Rejected request: {}", self),
            _ => tracing::error!("Balance request failed: {}", self),
        }

        crate::formatter::failure(&self)
    }
}

impl From<reqwest::Error> for AppError {
    /// Strips the request URL, which carries the account password, before stringifying.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            AppError::Transport(format!("Request timed out: {}", err))
        } else {
            AppError::Transport(format!("Request failed: {}", err))
        }
    }
}
