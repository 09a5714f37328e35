//! Caller admission: client signature and optional bearer token.

use crate::errors::{AppError, MSG_AUTH_REQUIRED, MSG_UNAUTHORIZED};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

/// Marker every Groundwire build puts in its `User-Agent`.
pub const SIGNATURE_MARKER: &str = "Groundwire/";
/// Signatures must be strictly shorter than this.
pub const MAX_SIGNATURE_LEN: usize = 200;

fn signature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9 ./\-_();]+$").expect("signature pattern is a valid regex")
    })
}

/// Admits or rejects a caller before any upstream work happens.
///
/// When `expected_token` is `None` the bearer check is skipped entirely.
pub fn admit(
    signature: Option<&str>,
    auth_header: Option<&str>,
    expected_token: Option<&str>,
) -> Result<(), AppError> {
    validate_signature(signature)?;

    match expected_token.filter(|t| !t.is_empty()) {
        Some(expected) => validate_bearer(auth_header, expected),
        None => {
            tracing::debug!("No bearer token configured, skipping credential check");
            Ok(())
        }
    }
}

/// Checks the claimed client signature against the Groundwire format.
pub fn validate_signature(signature: Option<&str>) -> Result<(), AppError> {
    let Some(signature) = signature else {
        tracing::warn!("Missing User-Agent header");
        return Err(AppError::Unauthorized(MSG_UNAUTHORIZED.to_string()));
    };

    if signature.chars().count() >= MAX_SIGNATURE_LEN {
        tracing::warn!("User-Agent too long ({} chars)", signature.chars().count());
        return Err(AppError::Unauthorized(MSG_UNAUTHORIZED.to_string()));
    }

    if !signature_pattern().is_match(signature) {
        tracing::warn!("User-Agent contains disallowed characters: {:?}", signature);
        return Err(AppError::Unauthorized(MSG_UNAUTHORIZED.to_string()));
    }

    if !signature.contains(SIGNATURE_MARKER) {
        tracing::warn!("User-Agent is not a Groundwire client: {:?}", signature);
        return Err(AppError::Unauthorized(MSG_UNAUTHORIZED.to_string()));
    }

    tracing::debug!("✓ Client signature accepted: {}", signature);
    Ok(())
}

/// Checks an `Authorization: Bearer <token>` header against the expected token.
pub fn validate_bearer(auth_header: Option<&str>, expected: &str) -> Result<(), AppError> {
    let Some(header) = auth_header else {
        tracing::warn!("Missing Authorization header");
        return Err(AppError::Unauthorized(MSG_AUTH_REQUIRED.to_string()));
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        tracing::warn!("Authorization header does not use the Bearer scheme");
        return Err(AppError::Unauthorized(MSG_AUTH_REQUIRED.to_string()));
    };

    if token.is_empty() {
        tracing::warn!("Empty bearer token");
        return Err(AppError::Unauthorized(MSG_AUTH_REQUIRED.to_string()));
    }

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        tracing::warn!(
            "Bearer token mismatch (len={}, preview={})",
            token.len(),
            token_preview(token)
        );
        return Err(AppError::Unauthorized(MSG_UNAUTHORIZED.to_string()));
    }

    tracing::debug!("✓ Bearer token validated (len={})", token.len());
    Ok(())
}

/// Compares SHA-256 digests so neither content nor length leaks through timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let ha = Sha256::digest(a);
    let hb = Sha256::digest(b);
    ha.ct_eq(&hb).into()
}

/// Short, non-reversible fingerprint of a token for log correlation.
pub fn token_preview(token: &str) -> String {
    let digest = hex::encode(Sha256::digest(token.as_bytes()));
    format!("sha256:{}", &digest[..8])
}
