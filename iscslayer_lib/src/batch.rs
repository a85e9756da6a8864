//! Bounded-concurrency batch orchestration.
//!
//! Workers run independent [`assemble_record`] pipelines behind a semaphore;
//! completions flow over a channel to a single consumer that merges state,
//! fires progress updates, and rebuilds the failure list in input order.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::assemble::assemble_record;
use crate::client::PortalSession;
use crate::error::SlayerError;
use crate::types::{BatchProgress, BatchResult, PolicyFailure, PolicyRecord};

/// A worker's completion message.
struct Completion {
    index: usize,
    policy_number: String,
    result: Result<PolicyRecord, SlayerError>,
}

/// Runs the assembler over `policy_numbers` with at most `concurrency`
/// pipelines in flight, invoking `on_progress` after every completion.
///
/// One policy's failure never aborts the batch or touches other pipelines.
/// `records` lands in completion order; `failed` preserves input order.
/// Callers are expected to have cleaned the input already (see
/// [`crate::validation::prepare_policy_numbers`]).
pub async fn run_batch(
    session: Arc<PortalSession>,
    policy_numbers: &[String],
    concurrency: usize,
    mut on_progress: impl FnMut(BatchProgress),
) -> BatchResult {
    let total = policy_numbers.len();
    let mut result = BatchResult {
        attempted: total,
        ..BatchResult::default()
    };
    if total == 0 {
        return result;
    }

    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (tx, mut rx) = mpsc::channel::<Completion>(concurrency * 2);
    let mut join_set = JoinSet::new();

    for (index, policy_number) in policy_numbers.iter().cloned().enumerate() {
        let sem = Arc::clone(&semaphore);
        let sender = tx.clone();
        let session = Arc::clone(&session);

        join_set.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            let result = assemble_record(&session, &policy_number).await;
            let _ = sender
                .send(Completion {
                    index,
                    policy_number,
                    result,
                })
                .await;
        });
    }
    drop(tx);

    let mut failures: Vec<Option<PolicyFailure>> = Vec::new();
    failures.resize_with(total, || None);
    let mut completed = 0usize;
    let mut failed = 0usize;

    while let Some(done) = rx.recv().await {
        completed += 1;
        match done.result {
            Ok(record) => {
                tracing::info!("Assembled policy {} ({})", done.policy_number, record.status);
                result.records.push(record);
            }
            Err(err) => {
                tracing::warn!("Policy {} failed: {}", done.policy_number, err);
                failed += 1;
                failures[done.index] = Some(PolicyFailure {
                    policy_number: done.policy_number,
                    error: err,
                });
            }
        }
        on_progress(BatchProgress {
            completed,
            total,
            succeeded: result.records.len(),
            failed,
        });
    }

    while join_set.join_next().await.is_some() {}

    result.failed = failures.into_iter().flatten().collect();
    result
}
