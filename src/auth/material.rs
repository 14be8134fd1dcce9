use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("auth type {0} selected but no credential was given")]
    MissingPayload(AuthKind),
    #[error("credential given without selecting an auth type")]
    MissingAuthType,
    #[error("basic credentials must look like user:password")]
    MalformedBasic,
    #[error("credential is not a valid header value")]
    InvalidHeaderValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    Token,
    Basic,
}

impl AuthKind {
    pub const ALL: [AuthKind; 2] = [AuthKind::Token, AuthKind::Basic];
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKind::Token => write!(f, "token"),
            AuthKind::Basic => write!(f, "basic"),
        }
    }
}

/// Authentication input as the user supplied it: an optional type and an
/// optional raw credential. Both or neither must be present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthMaterial {
    pub kind: Option<AuthKind>,
    pub payload: Option<String>,
}

impl AuthMaterial {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn token(value: impl Into<String>) -> Self {
        Self {
            kind: Some(AuthKind::Token),
            payload: Some(value.into()),
        }
    }

    pub fn basic(username: &str, password: &str) -> Self {
        Self {
            kind: Some(AuthKind::Basic),
            payload: Some(format!("{username}:{password}")),
        }
    }

    pub fn resolve(&self) -> Result<AuthConfig, AuthError> {
        let payload = self.payload.as_deref().filter(|value| !value.trim().is_empty());

        match (self.kind, payload) {
            (None, None) => Ok(AuthConfig::None),
            (None, Some(_)) => Err(AuthError::MissingAuthType),
            (Some(kind), None) => Err(AuthError::MissingPayload(kind)),
            (Some(AuthKind::Token), Some(token)) => Ok(AuthConfig::Token(token.to_string())),
            (Some(AuthKind::Basic), Some(raw)) => {
                let fields: Vec<&str> = raw.split(':').collect();
                match fields.as_slice() {
                    [username, password] if !username.is_empty() && !password.is_empty() => {
                        Ok(AuthConfig::Basic {
                            username: username.to_string(),
                            password: password.to_string(),
                        })
                    }
                    _ => Err(AuthError::MalformedBasic),
                }
            }
        }
    }
}

impl fmt::Debug for AuthMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthMaterial")
            .field("kind", &self.kind)
            .field("payload", &self.payload.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    None,
    /// Sent verbatim as the `Authorization` value.
    Token(String),
    Basic {
        username: String,
        password: String,
    },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => write!(f, "None"),
            AuthConfig::Token(_) => write!(f, "Token(<redacted>)"),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
