//! Wire format expected by the Groundwire balance checker.

use crate::errors::AppError;
use crate::models::{BalanceResponse, BalanceResult, ErrorResponse};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn balance_response(result: &BalanceResult, currency: &str) -> BalanceResponse {
    BalanceResponse {
        balance_string: format!("{} {}", currency, result.formatted()),
        balance: result.amount(),
        currency: currency.to_string(),
        timestamp: timestamp(),
    }
}

pub fn error_response(err: &AppError) -> ErrorResponse {
    ErrorResponse {
        error: true,
        message: err.user_message(),
        timestamp: timestamp(),
    }
}

/// 200 response carrying the formatted balance.
pub fn success(result: &BalanceResult, currency: &str) -> Response {
    no_cache((StatusCode::OK, Json(balance_response(result, currency))).into_response())
}

/// Error envelope with the status bound to the error kind.
pub fn failure(err: &AppError) -> Response {
    no_cache((err.status_code(), Json(error_response(err))).into_response())
}

fn no_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
