use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use volley::{
    auth::AuthKind,
    batch::{HttpMethod, RunState},
    config::{load_config, Overrides, SettingsBuilder},
    interactive::run_interactive,
    render::format_env_files,
    shell::execute_batch,
};

#[derive(Parser, Debug)]
#[command(
    name = "volley",
    version,
    about = "Fire a batch of concurrent HTTP requests at one URL",
    disable_help_subcommand = true
)]
struct Cli {
    /// Target URL (prompted for when missing)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// HTTP method
    #[arg(short = 'X', long, value_enum, ignore_case = true)]
    method: Option<HttpMethod>,

    /// Number of concurrent requests, clamped to 1-10
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Authentication scheme
    #[arg(long, value_enum)]
    auth_type: Option<AuthKind>,

    /// Credential: the full Authorization value for token, user:password for basic
    #[arg(long)]
    auth_value: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Preview the first N bytes of each response body
    #[arg(short, long)]
    preview: Option<usize>,

    /// Select a profile from volley.json
    #[arg(short = 'P', long)]
    profile: Option<String>,

    /// Directory or file containing volley.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Env file providing {VARIABLES} for the URL and credentials
    #[arg(short, long)]
    env: Option<PathBuf>,

    /// Always ask for the request interactively
    #[arg(short, long)]
    interactive: bool,

    /// Log dispatcher activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    let config_target = cli
        .config
        .as_ref()
        .map(|p| resolve_relative(&cwd, p))
        .unwrap_or_else(|| cwd.clone());
    let cfg = load_config(&config_target).context("loading configuration")?;
    if let Some(loaded) = &cfg {
        debug!(path = %loaded.path.display(), "configuration loaded");
    }

    let overrides = Overrides {
        url: cli.url.clone(),
        method: cli.method,
        count: cli.count,
        auth_kind: cli.auth_type,
        auth_value: cli.auth_value.clone(),
        timeout_secs: cli.timeout,
        preview_bytes: cli.preview,
        env_file: cli.env.as_ref().map(|p| resolve_relative(&cwd, p)),
    };
    let settings = SettingsBuilder::new(cfg, cli.profile.clone(), overrides).build()?;

    let request = match settings.batch_request() {
        Some(request) if !cli.interactive => request,
        _ => {
            run_interactive(settings).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    if let Some(line) = format_env_files(&settings.env_files) {
        println!("{line}");
    }
    let report = execute_batch(request, settings.dispatch_options()).await?;
    Ok(match report.state {
        RunState::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "volley=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_batch_flags() {
        let cli = Cli::parse_from([
            "volley",
            "https://example.test",
            "-X",
            "post",
            "-n",
            "-3",
            "--auth-type",
            "basic",
            "--auth-value",
            "alice:secret",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://example.test"));
        assert_eq!(cli.method, Some(HttpMethod::Post));
        assert_eq!(cli.count, Some(-3));
        assert_eq!(cli.auth_type, Some(AuthKind::Basic));
        assert_eq!(cli.auth_value.as_deref(), Some("alice:secret"));
    }

    #[test]
    fn resolve_relative_joins_when_needed() {
        let base = Path::new("/tmp/base");
        let relative = Path::new("volley.json");
        assert_eq!(resolve_relative(base, relative), base.join(relative));

        let absolute = Path::new("/etc/volley/volley.json");
        assert_eq!(resolve_relative(base, absolute), absolute);
    }
}
