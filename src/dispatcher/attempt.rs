use std::{panic::AssertUnwindSafe, time::Instant};

use futures_util::FutureExt;
use reqwest::{Client, Method};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    auth::AuthDecorator,
    batch::{AttemptFailure, RequestOutcome},
};

pub(super) struct Attempt {
    pub index: usize,
    pub client: Client,
    pub decorator: AuthDecorator,
    pub method: Method,
    pub url: String,
    pub preview_bytes: Option<usize>,
}

#[derive(Debug)]
pub(super) enum AttemptExit {
    Completed(RequestOutcome),
    Cancelled,
}

/// Runs one attempt until it produces an outcome or observes cancellation.
pub(super) async fn run_attempt(
    attempt: Attempt,
    cancel: CancellationToken,
) -> (usize, AttemptExit) {
    let index = attempt.index;
    let send = AssertUnwindSafe(attempt.execute()).catch_unwind();

    let exit = tokio::select! {
        biased;
        _ = cancel.cancelled() => AttemptExit::Cancelled,
        outcome = send => AttemptExit::Completed(outcome.unwrap_or_else(|_| {
            RequestOutcome::Failure(AttemptFailure::Transport("attempt panicked".to_string()))
        })),
    };

    debug!(attempt = index, ?exit, "attempt finished");
    (index, exit)
}

impl Attempt {
    async fn execute(self) -> RequestOutcome {
        let request = self
            .decorator
            .decorate(self.client.request(self.method, &self.url));

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return RequestOutcome::Failure(AttemptFailure::from_reqwest(&err)),
        };

        let status = response.status().as_u16();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return RequestOutcome::Failure(AttemptFailure::from_reqwest(&err)),
        };

        let preview = self
            .preview_bytes
            .filter(|limit| *limit > 0)
            .map(|limit| create_preview(&bytes, limit));

        RequestOutcome::Success {
            status,
            body_bytes: bytes.len(),
            preview,
            elapsed: start.elapsed(),
        }
    }
}

fn create_preview(bytes: &[u8], limit: usize) -> String {
    let slice = &bytes[..bytes.len().min(limit)];
    match std::str::from_utf8(slice) {
        Ok(text) => text.to_string(),
        Err(_) => hex::encode(slice),
    }
}
