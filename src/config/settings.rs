use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};

use crate::{
    auth::{AuthKind, AuthMaterial},
    batch::{BatchRequest, HttpMethod},
    dispatcher::{DispatchOptions, DEFAULT_TIMEOUT},
    env::{expand_vars, load_env_file, EnvMap},
};

use super::loader::{LoadedConfig, ProfileConfig, VolleyConfig};

/// Values given on the command line. They win over every config layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub count: Option<i64>,
    pub auth_kind: Option<AuthKind>,
    pub auth_value: Option<String>,
    pub timeout_secs: Option<u64>,
    pub preview_bytes: Option<usize>,
    pub env_file: Option<PathBuf>,
}

/// Everything needed to start runs, after config, profile, env file and
/// command line were merged and variables expanded.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub url: Option<String>,
    pub method: HttpMethod,
    pub count: i64,
    pub auth: AuthMaterial,
    pub timeout: Duration,
    pub preview_bytes: Option<usize>,
    pub profile_name: Option<String>,
    pub env_files: Vec<PathBuf>,
}

impl RunSettings {
    pub fn batch_request(&self) -> Option<BatchRequest> {
        let url = self.url.as_ref()?;
        let request = BatchRequest::new(url.clone(), self.method, self.count);
        Some(request.with_auth(self.auth.clone()))
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            timeout: self.timeout,
            preview_bytes: self.preview_bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    config: Option<LoadedConfig>,
    requested_profile: Option<String>,
    overrides: Overrides,
}

impl SettingsBuilder {
    pub fn new(
        config: Option<LoadedConfig>,
        requested_profile: Option<String>,
        overrides: Overrides,
    ) -> Self {
        Self {
            config,
            requested_profile,
            overrides,
        }
    }

    pub fn build(&self) -> Result<RunSettings> {
        let empty = ProfileConfig::default();
        let (defaults, profile, profile_name, config_dir) = match &self.config {
            Some(loaded) => {
                let (name, profile) =
                    resolve_profile(&loaded.config, self.requested_profile.as_deref())?;
                (&loaded.config.defaults, profile, name, Some(loaded.dir.as_path()))
            }
            None => {
                if let Some(name) = &self.requested_profile {
                    bail!("profile {name} requested but no configuration was found");
                }
                (&empty, &empty, None, None)
            }
        };

        let layers = [profile, defaults];
        let pick = |field: fn(&ProfileConfig) -> Option<String>| {
            layers.iter().find_map(|layer| field(layer))
        };

        let mut env = EnvMap::new();
        let mut env_files = Vec::new();
        let env_path = match &self.overrides.env_file {
            Some(explicit) => Some(explicit.clone()),
            None => pick(|layer| layer.env.clone())
                .map(|path| resolve_relative(config_dir, Path::new(&path))),
        };
        if let Some(path) = env_path {
            env_files.push(load_env_file(&path, &mut env)?);
        }

        let url = self
            .overrides
            .url
            .clone()
            .or_else(|| pick(|layer| layer.url.clone()))
            .map(|raw| expand_vars(&raw, &env).context("expanding URL"))
            .transpose()?;

        // Kind and value always come from the same auth entry. A command line
        // value may fill in a configured kind, a command line kind only keeps
        // a configured value of the same kind.
        let configured = layers.iter().find_map(|layer| layer.auth.as_ref());
        let (auth_kind, auth_value) = match (self.overrides.auth_kind, &self.overrides.auth_value)
        {
            (None, None) => configured
                .map(|entry| (entry.kind, entry.value.clone()))
                .unwrap_or_default(),
            (Some(kind), None) => (
                Some(kind),
                configured
                    .filter(|entry| entry.kind == Some(kind))
                    .and_then(|entry| entry.value.clone()),
            ),
            (kind, Some(value)) => (
                kind.or_else(|| configured.and_then(|entry| entry.kind)),
                Some(value.clone()),
            ),
        };
        let auth_value = auth_value
            .map(|raw| expand_vars(&raw, &env).context("expanding auth value"))
            .transpose()?;

        let timeout = self
            .overrides
            .timeout_secs
            .or_else(|| layers.iter().find_map(|layer| layer.timeout_secs))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(RunSettings {
            url,
            method: self
                .overrides
                .method
                .or_else(|| layers.iter().find_map(|layer| layer.method))
                .unwrap_or_default(),
            count: self
                .overrides
                .count
                .or_else(|| layers.iter().find_map(|layer| layer.count))
                .unwrap_or(1),
            auth: AuthMaterial {
                kind: auth_kind,
                payload: auth_value,
            },
            timeout,
            preview_bytes: self
                .overrides
                .preview_bytes
                .or_else(|| layers.iter().find_map(|layer| layer.preview_bytes)),
            profile_name,
            env_files,
        })
    }
}

fn resolve_relative(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if !path.is_absolute() => base.join(path),
        _ => path.to_path_buf(),
    }
}

fn resolve_profile<'a>(
    config: &'a VolleyConfig,
    requested: Option<&str>,
) -> Result<(Option<String>, &'a ProfileConfig)> {
    let name = match requested {
        Some(name) => {
            if !config.profiles.contains_key(name) {
                bail!("unknown profile {name}");
            }
            Some(name)
        }
        None => config
            .default_profile
            .as_deref()
            .filter(|name| config.profiles.contains_key(*name)),
    };

    Ok(match name {
        Some(name) => (Some(name.to_string()), &config.profiles[name]),
        None => (None, &config.defaults),
    })
}
