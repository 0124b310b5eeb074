//! Background release of orphaned blobs.
//!
//! Deleting metadata never waits on the blob store. Once a delete commits,
//! the freed references are queued here and released with exponential
//! backoff; a reference that still fails after the last attempt is logged
//! and left for an operator to reclaim.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use drivehub_core::config::storage::ReleaseConfig;
use drivehub_core::traits::blob::BlobRef;

use crate::manager::StorageManager;

enum ReleaseCommand {
    Release(BlobRef),
    Flush(oneshot::Sender<()>),
}

/// Handle to the release worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReleaseQueue {
    tx: mpsc::Sender<ReleaseCommand>,
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
}

impl ReleaseQueue {
    /// Start the worker on the current runtime.
    ///
    /// The worker stops once every handle has been dropped and the pending
    /// releases have finished.
    pub fn spawn(storage: StorageManager, config: &ReleaseConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let policy = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        };
        let handle = tokio::spawn(run_worker(storage, policy, rx));
        (Self { tx }, handle)
    }

    /// Queue references for release.
    ///
    /// Waits for channel capacity, so a `flush` issued after this returns
    /// covers every reference passed in.
    pub async fn enqueue(&self, blob_refs: impl IntoIterator<Item = BlobRef>) {
        for blob_ref in blob_refs {
            let sent = self.tx.send(ReleaseCommand::Release(blob_ref)).await;
            if let Err(mpsc::error::SendError(ReleaseCommand::Release(blob_ref))) = sent {
                error!(blob_ref = %blob_ref, "Release worker stopped; blob left orphaned");
            }
        }
    }

    /// Wait until every release queued so far has finished (successfully or
    /// not).
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(ReleaseCommand::Flush(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_worker(
    storage: StorageManager,
    policy: RetryPolicy,
    mut rx: mpsc::Receiver<ReleaseCommand>,
) {
    let mut tasks = JoinSet::new();
    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(ReleaseCommand::Release(blob_ref)) => {
                    tasks.spawn(release_with_retry(storage.clone(), policy, blob_ref));
                }
                Some(ReleaseCommand::Flush(done)) => {
                    while tasks.join_next().await.is_some() {}
                    let _ = done.send(());
                }
                None => break,
            },
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }
    while tasks.join_next().await.is_some() {}
    debug!("Release worker stopped");
}

async fn release_with_retry(storage: StorageManager, policy: RetryPolicy, blob_ref: BlobRef) {
    let mut backoff = policy.initial_backoff;
    for attempt in 1..=policy.max_attempts {
        match storage.release(&blob_ref).await {
            Ok(()) => {
                debug!(blob_ref = %blob_ref, attempt, "Blob released");
                return;
            }
            Err(e) if attempt < policy.max_attempts => {
                warn!(
                    blob_ref = %blob_ref,
                    attempt,
                    retry_in_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Blob release failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
            Err(e) => {
                error!(
                    blob_ref = %blob_ref,
                    attempts = policy.max_attempts,
                    error = %e,
                    "Giving up on blob release; blob is orphaned"
                );
            }
        }
    }
}
