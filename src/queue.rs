// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::submission::VoteSubmission;
use crate::{Error, Result};

/// A persisted submission awaiting delivery.
///
/// An entry exists in the store iff its submission has not been
/// acknowledged by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub submission: VoteSubmission,
    /// Delivery attempts so far; operator logs only, never gates retry.
    #[serde(default)]
    pub attempts: u32,
}

impl QueueEntry {
    pub fn new(submission: VoteSubmission) -> Self {
        QueueEntry {
            submission,
            attempts: 0,
        }
    }
}

/// Durable backing store for the pending queue.
///
/// The queue is one named list value, read and rewritten as a whole; a
/// store only needs to keep that list across process restarts.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn load(&self) -> Result<Vec<QueueEntry>>;
    async fn save(&self, entries: &[QueueEntry]) -> Result<()>;
}

/// In-memory store for tests and sessions that can afford to lose the
/// queue on exit.
#[derive(Default)]
pub struct MemoryQueueStore {
    entries: Mutex<Vec<QueueEntry>>,
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn load(&self) -> Result<Vec<QueueEntry>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn save(&self, entries: &[QueueEntry]) -> Result<()> {
        *self.entries.lock().await = entries.to_vec();
        Ok(())
    }
}

/// Queue snapshot in a single JSON file.
///
/// Snapshots are written to a temporary sibling and renamed into place,
/// so an interrupted write leaves the previous snapshot intact. A missing
/// file reads as an empty queue.
pub struct JsonFileQueueStore {
    path: PathBuf,
}

impl JsonFileQueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileQueueStore { path: path.into() }
    }
}

#[async_trait]
impl QueueStore for JsonFileQueueStore {
    async fn load(&self) -> Result<Vec<QueueEntry>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|err| Error::Store(err.to_string()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(Error::Store(err.to_string())),
        }
    }

    async fn save(&self, entries: &[QueueEntry]) -> Result<()> {
        let bytes = serde_json::to_vec(entries).map_err(|err| Error::Store(err.to_string()))?;
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|err| Error::Store(err.to_string()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|err| Error::Store(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_submission;

    #[tokio::test]
    async fn file_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending_votes.json");

        let entries = vec![
            QueueEntry::new(sample_submission("q-1")),
            QueueEntry::new(sample_submission("q-2")),
        ];
        JsonFileQueueStore::new(&path).save(&entries).await.unwrap();

        // A fresh instance stands in for a process restart.
        let reopened = JsonFileQueueStore::new(&path).load().await.unwrap();

        assert_eq!(reopened, entries);
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileQueueStore::new(dir.path().join("absent.json"));

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending_votes.json");
        let store = JsonFileQueueStore::new(&path);

        store
            .save(&[QueueEntry::new(sample_submission("q-1"))])
            .await
            .unwrap();
        store.save(&[]).await.unwrap();

        assert!(store.load().await.unwrap().is_empty());
    }
}
