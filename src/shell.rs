use anyhow::{bail, Result};
use tracing::debug;

use crate::{
    batch::{BatchEvent, BatchReport, BatchRequest},
    dispatcher::{DispatchOptions, Dispatcher},
    render::{format_header, format_outcome, format_report, progress_bar},
};

/// Runs one batch, printing outcomes as they arrive. Ctrl-C cancels the run;
/// the report is printed and returned in every case.
pub async fn execute_batch(request: BatchRequest, options: DispatchOptions) -> Result<BatchReport> {
    println!("{}", format_header(&request));

    let mut handle = Dispatcher::with_options(options).run(request)?;
    let canceller = handle.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling batch");
            canceller.cancel();
        }
    });

    let progress = progress_bar(handle.requested());
    let report = loop {
        match handle.next_event().await {
            Some(BatchEvent::Outcome { attempt, outcome }) => {
                progress.suspend(|| println!("{}", format_outcome(attempt, &outcome)));
                progress.inc(1);
            }
            Some(BatchEvent::Finished(report)) => break report,
            None => {
                interrupt.abort();
                progress.abandon();
                bail!("batch ended without a final report");
            }
        }
    };

    interrupt.abort();
    progress.finish_and_clear();
    println!("{}", format_report(&report));
    Ok(report)
}
