use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    RequestBuilder,
};

use super::material::{AuthConfig, AuthError};

/// Adds the prepared `Authorization` header to outgoing requests. Cheap to
/// clone and shared by every attempt of a run.
#[derive(Clone, Default)]
pub struct AuthDecorator {
    header: Option<HeaderValue>,
}

impl AuthDecorator {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.header {
            Some(value) => request.header(AUTHORIZATION, value.clone()),
            None => request,
        }
    }
}

impl fmt::Debug for AuthDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthDecorator")
            .field("authorization", &self.header.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub fn build_decorator(config: &AuthConfig) -> Result<AuthDecorator, AuthError> {
    let value = match config {
        AuthConfig::None => return Ok(AuthDecorator::identity()),
        AuthConfig::Token(token) => token.clone(),
        AuthConfig::Basic { username, password } => {
            if username.is_empty() || password.is_empty() || username.contains(':') {
                return Err(AuthError::MalformedBasic);
            }
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            format!("Basic {encoded}")
        }
    };

    let mut header =
        HeaderValue::from_str(&value).map_err(|_| AuthError::InvalidHeaderValue)?;
    header.set_sensitive(true);

    Ok(AuthDecorator {
        header: Some(header),
    })
}
