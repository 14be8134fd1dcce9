use thiserror::Error;
use url::Url;

use crate::auth::{AuthConfig, AuthError};

use super::models::BatchRequest;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("target URL is empty")]
    EmptyUrl,
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported URL scheme {0}, expected http or https")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Checks a request before anything is spawned and returns the resolved
/// authentication config.
pub fn pre_flight_check(request: &BatchRequest) -> Result<AuthConfig, ValidationError> {
    let raw = request.url().trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let url = Url::parse(raw).map_err(|err| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(request.auth().resolve()?)
}
