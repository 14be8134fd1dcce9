use std::{fmt, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Timeout(String),
    Connect(String),
    Transport(String),
}

impl AttemptFailure {
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let description = describe(error);
        if error.is_timeout() {
            AttemptFailure::Timeout(description)
        } else if error.is_connect() {
            AttemptFailure::Connect(description)
        } else {
            AttemptFailure::Transport(description)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptFailure::Timeout(_))
    }

    pub fn description(&self) -> &str {
        match self {
            AttemptFailure::Timeout(text)
            | AttemptFailure::Connect(text)
            | AttemptFailure::Transport(text) => text,
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            AttemptFailure::Timeout(_) => "timeout",
            AttemptFailure::Connect(_) => "connection error",
            AttemptFailure::Transport(_) => "transport error",
        };
        write!(f, "{kind}: {}", self.description())
    }
}

// reqwest's top-level message is terse; the source chain carries the cause.
fn describe(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Any HTTP status counts as a success; only transport errors fail.
    Success {
        status: u16,
        body_bytes: usize,
        preview: Option<String>,
        elapsed: Duration,
    },
    Failure(AttemptFailure),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestOutcome::Success { status, .. } => Some(*status),
            RequestOutcome::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::Failed | RunState::Cancelled
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Created => "created",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Outcomes collected for one run. Entries are in arrival order, which carries
/// no meaning: attempts are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    outcomes: Vec<(usize, RequestOutcome)>,
    abandoned: usize,
}

impl BatchResult {
    pub(crate) fn record(&mut self, attempt: usize, outcome: RequestOutcome) {
        self.outcomes.push((attempt, outcome));
    }

    pub(crate) fn abandon(&mut self, attempts: usize) {
        self.abandoned += attempts;
    }

    pub fn outcomes(&self) -> &[(usize, RequestOutcome)] {
        &self.outcomes
    }

    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn abandoned(&self) -> usize {
        self.abandoned
    }

    pub fn successes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &AttemptFailure> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            RequestOutcome::Failure(failure) => Some(failure),
            RequestOutcome::Success { .. } => None,
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchFault {
    #[error("could not build HTTP client: {0}")]
    Client(String),
    #[error("dispatcher stopped unexpectedly: {0}")]
    Supervisor(String),
}

/// Frozen view of a run once it reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub state: RunState,
    pub requested: usize,
    pub result: BatchResult,
    pub fault: Option<DispatchFault>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Outcome {
        attempt: usize,
        outcome: RequestOutcome,
    },
    Finished(BatchReport),
}
