// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::queue::{QueueEntry, QueueStore};
use crate::submission::{VoteReceipt, VoteSubmission};
use crate::transport::VoteTransport;
use crate::{Error, Result};

/// Upper bound on a single network attempt. A hit counts as a
/// connectivity failure, not data loss.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of handing a submission to the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionOutcome {
    /// The server acknowledged the vote.
    Delivered(VoteReceipt),
    /// Connectivity failed; the vote is saved locally, pending delivery.
    Queued,
}

/// Result of one drain pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrainReport {
    /// Acknowledgements collected during the pass.
    pub delivered: Vec<VoteReceipt>,
    /// Entries still pending after the pass.
    pub retained: usize,
    /// Submissions the server refused; dropped from the queue and handed
    /// back for operator review rather than retried forever.
    pub rejected: Vec<VoteSubmission>,
    /// True when another drain was already running and this call did
    /// nothing.
    pub already_draining: bool,
}

/// Owns the pending-vote queue and drives every submission through the
/// send-or-queue state machine.
///
/// All queue mutations go through one controller instance; nothing else
/// touches the store. The embedding layer wires its connectivity-restored
/// signal to [`SubmissionController::drain`].
pub struct SubmissionController<T, S> {
    transport: T,
    store: S,
    send_timeout: Duration,
    // serializes queue rewrites between submit() and a running drain
    queue_lock: Mutex<()>,
    draining: AtomicBool,
}

impl<T, S> SubmissionController<T, S>
where
    T: VoteTransport,
    S: QueueStore,
{
    pub fn new(transport: T, store: S) -> Self {
        SubmissionController {
            transport,
            store,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            queue_lock: Mutex::new(()),
            draining: AtomicBool::new(false),
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Attempts immediate delivery, falling back to the durable queue on
    /// a connectivity failure. A queued vote is neither a success nor a
    /// hard failure; report it to the operator as saved, pending
    /// delivery. A validated rejection is surfaced as an error and never
    /// queued.
    pub async fn submit(&self, submission: VoteSubmission) -> Result<SubmissionOutcome> {
        match self.attempt(&submission).await {
            Ok(receipt) => {
                debug!(question_id = %submission.question_id, vote_id = %receipt.vote_id, "vote delivered");
                Ok(SubmissionOutcome::Delivered(receipt))
            }
            Err(TransportError::Rejected { status, detail }) => {
                warn!(status, %detail, "server rejected vote payload");
                Err(Error::Transport(TransportError::Rejected { status, detail }))
            }
            Err(err) => {
                debug!(%err, "delivery failed, queuing vote");
                self.enqueue(submission).await?;
                Ok(SubmissionOutcome::Queued)
            }
        }
    }

    /// Walks the pending queue front to back, attempting delivery of
    /// each entry in enqueue order. Strictly sequential, so entries that
    /// stay behind keep their relative order. Concurrent calls collapse
    /// to a single pass, and an empty queue is a no-op with zero network
    /// calls.
    pub async fn drain(&self) -> Result<DrainReport> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("drain already in progress, skipping");
            return Ok(DrainReport {
                already_draining: true,
                ..DrainReport::default()
            });
        }

        let result = self.drain_pass().await;
        self.draining.store(false, Ordering::Release);
        result
    }

    async fn drain_pass(&self) -> Result<DrainReport> {
        let pending = self.store.load().await?;
        if pending.is_empty() {
            return Ok(DrainReport::default());
        }
        info!(pending = pending.len(), "draining pending votes");

        let mut report = DrainReport::default();
        for entry in pending {
            match self.attempt(&entry.submission).await {
                Ok(receipt) => {
                    self.remove(&entry.submission).await?;
                    debug!(vote_id = %receipt.vote_id, "queued vote delivered");
                    report.delivered.push(receipt);
                }
                Err(TransportError::Rejected { status, detail }) => {
                    warn!(status, %detail, "queued vote refused by server, dropping");
                    self.remove(&entry.submission).await?;
                    report.rejected.push(entry.submission);
                }
                Err(err) => {
                    debug!(%err, attempts = entry.attempts + 1, "queued vote still undeliverable");
                    self.bump_attempts(&entry.submission).await?;
                }
            }
        }

        report.retained = self.store.load().await?.len();
        info!(
            delivered = report.delivered.len(),
            retained = report.retained,
            "drain pass complete"
        );
        Ok(report)
    }

    /// One timeout-bounded transport attempt.
    async fn attempt(
        &self,
        submission: &VoteSubmission,
    ) -> std::result::Result<VoteReceipt, TransportError> {
        match timeout(self.send_timeout, self.transport.send(submission)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Connectivity(format!(
                "send attempt exceeded {:?}",
                self.send_timeout
            ))),
        }
    }

    async fn enqueue(&self, submission: VoteSubmission) -> Result<()> {
        let _guard = self.queue_lock.lock().await;
        let mut entries = self.store.load().await?;
        entries.push(QueueEntry::new(submission));
        self.store.save(&entries).await?;
        info!(pending = entries.len(), "vote saved, pending delivery");
        Ok(())
    }

    // Entries leave the queue only here, after a confirmed ack or a
    // validated rejection.
    async fn remove(&self, submission: &VoteSubmission) -> Result<()> {
        let _guard = self.queue_lock.lock().await;
        let mut entries = self.store.load().await?;
        entries.retain(|entry| &entry.submission != submission);
        self.store.save(&entries).await
    }

    async fn bump_attempts(&self, submission: &VoteSubmission) -> Result<()> {
        let _guard = self.queue_lock.lock().await;
        let mut entries = self.store.load().await?;
        for entry in entries
            .iter_mut()
            .filter(|entry| &entry.submission == submission)
        {
            entry.attempts += 1;
        }
        self.store.save(&entries).await
    }
}
