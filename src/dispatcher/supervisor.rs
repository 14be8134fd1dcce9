use std::collections::HashMap;

use futures_util::FutureExt;
use reqwest::{Client, Method};
use tokio::{
    sync::{mpsc, watch},
    task::{self, JoinError, JoinSet},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    auth::AuthDecorator,
    batch::{
        AttemptFailure, BatchEvent, BatchReport, BatchRequest, BatchResult, DispatchFault,
        RequestOutcome, RunState,
    },
};

use super::attempt::{run_attempt, Attempt, AttemptExit};

/// Owns the client and every attempt of one run, and is the only writer of
/// its events and state.
pub(super) struct Supervisor {
    pub request: BatchRequest,
    pub client: Client,
    pub decorator: AuthDecorator,
    pub preview_bytes: Option<usize>,
    pub cancel: CancellationToken,
    pub events: mpsc::UnboundedSender<BatchEvent>,
    pub state: watch::Sender<RunState>,
}

/// Partial result of a run before it is frozen into a report.
struct Collector {
    result: BatchResult,
    events: mpsc::UnboundedSender<BatchEvent>,
    indices: HashMap<task::Id, usize>,
}

impl Collector {
    /// Records a joined attempt. Returns whether it failed, or `None` when it
    /// acknowledged cancellation.
    fn accept(&mut self, joined: Result<(usize, AttemptExit), JoinError>) -> Option<bool> {
        match joined {
            Ok((attempt, AttemptExit::Completed(outcome))) => Some(self.complete(attempt, outcome)),
            Ok((_, AttemptExit::Cancelled)) => None,
            Err(err) => {
                warn!(error = %err, "attempt task did not complete");
                let attempt = *self.indices.get(&err.id())?;
                let failure = AttemptFailure::Transport(format!("attempt task failed: {err}"));
                Some(self.complete(attempt, RequestOutcome::Failure(failure)))
            }
        }
    }

    fn complete(&mut self, attempt: usize, outcome: RequestOutcome) -> bool {
        let failed = !outcome.is_success();
        // A closed receiver only means nobody is listening anymore.
        let _ = self.events.send(BatchEvent::Outcome {
            attempt,
            outcome: outcome.clone(),
        });
        self.result.record(attempt, outcome);
        failed
    }
}

impl Supervisor {
    pub async fn run(self) -> BatchReport {
        let Supervisor {
            request,
            client,
            decorator,
            preview_bytes,
            cancel,
            events,
            state,
        } = self;

        let requested = request.count();
        let method = Method::from(request.method());
        let mut attempts = JoinSet::new();
        let mut indices = HashMap::new();

        if !cancel.is_cancelled() {
            for index in 0..requested {
                let attempt = Attempt {
                    index,
                    client: client.clone(),
                    decorator: decorator.clone(),
                    method: method.clone(),
                    url: request.url().to_string(),
                    preview_bytes,
                };
                let spawned = attempts.spawn(run_attempt(attempt, cancel.child_token()));
                indices.insert(spawned.id(), index);
            }
        }
        state.send_replace(RunState::Running);
        info!(url = request.url(), method = %request.method(), count = requested, "batch started");

        let mut collector = Collector {
            result: BatchResult::default(),
            events,
            indices,
        };

        let terminal = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    // Wait until every attempt completed or acknowledged.
                    while let Some(joined) = attempts.join_next().await {
                        collector.accept(joined);
                    }
                    break RunState::Cancelled;
                }
                joined = attempts.join_next() => {
                    let Some(joined) = joined else {
                        break RunState::Succeeded;
                    };
                    if collector.accept(joined) == Some(true) {
                        cancel.cancel();
                        // Keep completions that already landed, abandon the rest.
                        while let Some(Some(joined)) = attempts.join_next().now_or_never() {
                            collector.accept(joined);
                        }
                        break RunState::Failed;
                    }
                }
            }
        };

        attempts.shutdown().await;
        drop(client);

        let Collector {
            mut result, events, ..
        } = collector;
        result.abandon(requested - result.completed());

        let report = BatchReport {
            state: terminal,
            requested,
            result,
            fault: None,
        };
        info!(
            state = %report.state,
            completed = report.result.completed(),
            abandoned = report.result.abandoned(),
            "batch finished"
        );
        finish(&state, &events, report)
    }
}

/// Terminates a run that could not start.
pub(super) async fn fail_run(
    requested: usize,
    fault: DispatchFault,
    events: mpsc::UnboundedSender<BatchEvent>,
    state: watch::Sender<RunState>,
) -> BatchReport {
    warn!(error = %fault, "batch could not be dispatched");
    let mut result = BatchResult::default();
    result.abandon(requested);
    let report = BatchReport {
        state: RunState::Failed,
        requested,
        result,
        fault: Some(fault),
    };
    finish(&state, &events, report)
}

fn finish(
    state: &watch::Sender<RunState>,
    events: &mpsc::UnboundedSender<BatchEvent>,
    report: BatchReport,
) -> BatchReport {
    state.send_replace(report.state);
    if events.send(BatchEvent::Finished(report.clone())).is_err() {
        debug!("run finished with no event listener");
    }
    report
}
