use anyhow::{anyhow, Result};
use inquire::{
    error::CustomUserError, validator::Validation, Confirm, InquireError, Select, Text,
};

use crate::{
    auth::{AuthKind, AuthMaterial},
    batch::{pre_flight_check, BatchRequest, HttpMethod, MAX_REQUESTS, MIN_REQUESTS},
    config::RunSettings,
    render::format_env_files,
    shell::execute_batch,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

pub async fn run_interactive(settings: RunSettings) -> Result<()> {
    let mut ui = InquireUi;
    run_interactive_with_ui(settings, &mut ui).await
}

pub(crate) async fn run_interactive_with_ui(
    mut settings: RunSettings,
    ui: &mut dyn InteractiveUi,
) -> Result<()> {
    ui.print(&format!("volley v{} (built {})", VERSION, BUILD_TIMESTAMP));
    if let Some(profile) = &settings.profile_name {
        ui.print(&format!("profile: {profile}"));
    }
    if let Some(line) = format_env_files(&settings.env_files) {
        ui.print(&line);
    }

    loop {
        let Some(request) = prompt_request(ui, &settings)? else {
            return Ok(());
        };

        // Validation errors are shown right away and nothing is dispatched.
        if let Err(err) = pre_flight_check(&request) {
            ui.print(&format!("Invalid request: {err}"));
        } else {
            remember(&mut settings, &request);
            if let Err(err) = execute_batch(request, settings.dispatch_options()).await {
                ui.print(&format!("Error: {err:#}"));
            }
        }

        if !ui.confirm("Run another batch?", true)? {
            return Ok(());
        }
    }
}

/// Asks for every field of a batch, offering the previous answers as
/// defaults. `None` means the user backed out.
fn prompt_request(
    ui: &mut dyn InteractiveUi,
    defaults: &RunSettings,
) -> Result<Option<BatchRequest>> {
    let Some(url) = ui.input("URL", defaults.url.as_deref())? else {
        return Ok(None);
    };

    let methods: Vec<String> = HttpMethod::ALL.iter().map(|m| m.to_string()).collect();
    let start = HttpMethod::ALL
        .iter()
        .position(|m| *m == defaults.method)
        .unwrap_or(0);
    let method = HttpMethod::ALL[ui.select("Method", &methods, start)?];

    let mut auth_labels = vec!["none".to_string()];
    auth_labels.extend(AuthKind::ALL.iter().map(|kind| kind.to_string()));
    let start = match defaults.auth.kind {
        Some(kind) => AuthKind::ALL.iter().position(|k| *k == kind).map_or(0, |i| i + 1),
        None => 0,
    };
    let auth = match ui.select("Authentication", &auth_labels, start)? {
        0 => AuthMaterial::none(),
        index => {
            let kind = AuthKind::ALL[index - 1];
            let hint = match kind {
                AuthKind::Token => "Authorization value",
                AuthKind::Basic => "user:password",
            };
            let previous = defaults
                .auth
                .payload
                .as_deref()
                .filter(|_| defaults.auth.kind == Some(kind));
            let Some(payload) = ui.input(hint, previous)? else {
                return Ok(None);
            };
            AuthMaterial {
                kind: Some(kind),
                payload: Some(payload),
            }
        }
    };

    let count_prompt = format!("Requests ({MIN_REQUESTS}-{MAX_REQUESTS})");
    let Some(raw_count) = ui.input(&count_prompt, Some(&defaults.count.to_string()))? else {
        return Ok(None);
    };
    let count = match raw_count.trim().parse::<i64>() {
        Ok(count) => count,
        Err(_) => {
            ui.print(&format!("Not a number: {raw_count}, using {}", defaults.count));
            defaults.count
        }
    };

    Ok(Some(BatchRequest::new(url.trim(), method, count).with_auth(auth)))
}

fn remember(settings: &mut RunSettings, request: &BatchRequest) {
    settings.url = Some(request.url().to_string());
    settings.method = request.method();
    settings.count = request.count() as i64;
    settings.auth = request.auth().clone();
}

pub(crate) trait InteractiveUi {
    fn print(&mut self, message: &str);
    fn select(&mut self, prompt: &str, items: &[String], start: usize) -> Result<usize>;
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
}

struct InquireUi;

impl InteractiveUi for InquireUi {
    fn print(&mut self, message: &str) {
        println!("{}", message);
    }

    fn select(&mut self, prompt: &str, items: &[String], start: usize) -> Result<usize> {
        let choice = Select::new(prompt, items.to_vec())
            .with_starting_cursor(start)
            .prompt()?;
        items
            .iter()
            .position(|item| item == &choice)
            .ok_or_else(|| anyhow!("selection not found"))
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut builder = Text::new(prompt).with_validator(|value: &str| {
            Ok::<_, CustomUserError>(if value.trim().is_empty() {
                Validation::Invalid("a value is required".into())
            } else {
                Validation::Valid
            })
        });
        if let Some(value) = default {
            builder = builder.with_default(value);
        }
        match builder.prompt() {
            Ok(value) => Ok(Some(value)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        match Confirm::new(prompt).with_default(default).prompt() {
            Ok(value) => Ok(value),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }
}
