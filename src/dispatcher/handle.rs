use futures_util::{stream, Stream};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::batch::{BatchEvent, BatchReport, BatchResult, DispatchFault, RunState};

/// Cloneable cancellation switch for a run, usable from another task while
/// the owner of the [`RunHandle`] consumes events.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Requests cancellation. Repeated calls and calls after the run finished
    /// do nothing.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// One in-flight batch. Dropping the handle before the run finished cancels
/// it.
#[derive(Debug)]
pub struct RunHandle {
    requested: usize,
    events: mpsc::UnboundedReceiver<BatchEvent>,
    state: watch::Receiver<RunState>,
    cancel: CancellationToken,
    guard: DropGuard,
    task: JoinHandle<BatchReport>,
}

impl RunHandle {
    pub(super) fn new(
        requested: usize,
        events: mpsc::UnboundedReceiver<BatchEvent>,
        state: watch::Receiver<RunState>,
        cancel: CancellationToken,
        task: JoinHandle<BatchReport>,
    ) -> Self {
        let guard = cancel.clone().drop_guard();
        Self {
            requested,
            events,
            state,
            cancel,
            guard,
            task,
        }
    }

    /// Number of attempts this run dispatches.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    /// Next event of the run, `None` once the terminal event was consumed.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Waits for the run to finish, discarding outcome events, and returns
    /// the final report.
    pub async fn finish(mut self) -> BatchReport {
        while let Some(event) = self.events.recv().await {
            if let BatchEvent::Finished(report) = event {
                return report;
            }
        }

        // The channel closed without a terminal event: the supervisor is gone.
        let requested = self.requested;
        match (&mut self.task).await {
            Ok(report) => report,
            Err(err) => {
                let mut result = BatchResult::default();
                result.abandon(requested);
                BatchReport {
                    state: RunState::Failed,
                    requested,
                    result,
                    fault: Some(DispatchFault::Supervisor(err.to_string())),
                }
            }
        }
    }

    /// Converts the handle into a stream of events. Take a
    /// [`CancelHandle`] first if the run must stay cancellable.
    pub fn into_events(self) -> impl Stream<Item = BatchEvent> {
        let RunHandle { events, guard, .. } = self;
        stream::unfold((events, guard), |(mut events, guard)| async move {
            events.recv().await.map(|event| (event, (events, guard)))
        })
    }
}
