use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{auth::AuthKind, batch::HttpMethod};

pub const CONFIG_FILE_NAME: &str = "volley.json";

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AuthEntry {
    #[serde(rename = "type")]
    pub kind: Option<AuthKind>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProfileConfig {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub count: Option<i64>,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "previewBytes")]
    pub preview_bytes: Option<usize>,
    pub auth: Option<AuthEntry>,
    pub env: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VolleyConfig {
    #[serde(flatten)]
    pub defaults: ProfileConfig,
    pub profiles: HashMap<String, ProfileConfig>,
    #[serde(rename = "defaultProfile")]
    pub default_profile: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: VolleyConfig,
    pub path: PathBuf,
    pub dir: PathBuf,
}

/// Loads `volley.json` from `target`, which may be the file itself or the
/// directory holding it. A missing file is not an error.
pub fn load_config(target: &Path) -> Result<Option<LoadedConfig>> {
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()?.join(target)
    };

    let (file_path, dir) = if resolved.is_dir() {
        (resolved.join(CONFIG_FILE_NAME), resolved)
    } else {
        let dir = match resolved.parent() {
            Some(parent) => parent.to_path_buf(),
            None => std::env::current_dir()?,
        };
        (resolved, dir)
    };

    if !file_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&file_path)
        .with_context(|| format!("reading config {}", file_path.display()))?;

    let config: VolleyConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", file_path.display()))?;

    Ok(Some(LoadedConfig {
        config,
        path: file_path,
        dir,
    }))
}
