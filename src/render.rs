use std::path::PathBuf;

use colored::{Color, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{BatchReport, BatchRequest, RequestOutcome, RunState};

fn status_color(status: u16) -> Color {
    if status >= 400 {
        Color::Red
    } else if status >= 300 {
        Color::Yellow
    } else {
        Color::Green
    }
}

pub fn format_header(request: &BatchRequest) -> String {
    format!(
        "{} {} {}",
        request.method().as_str().bold(),
        request.url().cyan(),
        format!("x{}", request.count()).dimmed()
    )
}

pub fn format_outcome(attempt: usize, outcome: &RequestOutcome) -> String {
    let label = format!("#{:<2}", attempt + 1).dimmed();
    match outcome {
        RequestOutcome::Success {
            status,
            body_bytes,
            preview,
            elapsed,
        } => {
            let mut line = format!(
                "{} > {} {}",
                label,
                status.to_string().color(status_color(*status)),
                format!(
                    "({:.1} ms, {} bytes)",
                    elapsed.as_secs_f64() * 1000.0,
                    body_bytes
                )
                .dimmed()
            );
            if let Some(preview) = preview {
                line.push_str(&format!("\n     {}", preview.dimmed()));
            }
            line
        }
        RequestOutcome::Failure(failure) => {
            format!("{} - {}", label, failure.to_string().red())
        }
    }
}

pub fn format_report(report: &BatchReport) -> String {
    let state = match report.state {
        RunState::Succeeded => report.state.to_string().green(),
        RunState::Failed => report.state.to_string().red(),
        _ => report.state.to_string().yellow(),
    };
    let failures = report.result.failures().count();

    let mut line = format!(
        "{} {} {}",
        "Batch".bold(),
        state.bold(),
        format!(
            "({} ok, {} failed, {} abandoned of {})",
            report.result.successes(),
            failures,
            report.result.abandoned(),
            report.requested
        )
        .dimmed()
    );
    if let Some(fault) = &report.fault {
        line.push_str(&format!("\n{} {}", "Error:".bold(), fault.to_string().red()));
    }
    line
}

/// Names the env files that fed the run, if any.
pub fn format_env_files(files: &[PathBuf]) -> Option<String> {
    if files.is_empty() {
        return None;
    }
    let names = files
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("{} {}", "Env:".bold(), names.dimmed()))
}

pub fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {pos}/{len} {wide_bar} {elapsed}") {
        bar.set_style(style);
    }
    bar
}
