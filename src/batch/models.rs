use std::fmt;

use reqwest::Method;
use serde::Deserialize;

use crate::auth::AuthMaterial;

pub const MIN_REQUESTS: usize = 1;
pub const MAX_REQUESTS: usize = 10;

/// Normalizes a user supplied request count into `MIN_REQUESTS..=MAX_REQUESTS`.
pub fn clamp_count(count: i64) -> usize {
    if count < MIN_REQUESTS as i64 {
        MIN_REQUESTS
    } else if count > MAX_REQUESTS as i64 {
        MAX_REQUESTS
    } else {
        count as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[cfg_attr(feature = "cli", value(name = "GET"))]
    Get,
    #[cfg_attr(feature = "cli", value(name = "POST"))]
    Post,
    #[cfg_attr(feature = "cli", value(name = "HEAD"))]
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 3] = [HttpMethod::Get, HttpMethod::Post, HttpMethod::Head];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Head => Method::HEAD,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one batch run. The count is clamped on
/// construction so a request with fewer than one attempt cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    url: String,
    method: HttpMethod,
    count: usize,
    auth: AuthMaterial,
}

impl BatchRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod, count: i64) -> Self {
        Self {
            url: url.into(),
            method,
            count: clamp_count(count),
            auth: AuthMaterial::none(),
        }
    }

    pub fn with_auth(mut self, auth: AuthMaterial) -> Self {
        self.auth = auth;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn auth(&self) -> &AuthMaterial {
        &self.auth
    }
}
