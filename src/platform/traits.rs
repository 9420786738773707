//! Collaborator traits the factory orchestrates
//!
//! Each trait is a seam to a platform service. The crate ships default
//! implementations (local file system, HTTP, ZIP, console, system opener) and
//! tests substitute scripted ones.

use crate::error::{Result, TransferError};
use crate::types::Progress;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What a path resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// The entry is a regular file
    pub is_file: bool,
    /// The entry is a directory
    pub is_dir: bool,
}

/// File-system access: resolution and removal
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Resolve a path
    ///
    /// Returns `Ok(None)` when nothing exists at `path`. Any other failure is an
    /// error and is propagated unchanged by the factory.
    async fn resolve(&self, path: &Path) -> Result<Option<ResolvedEntry>>;

    /// Remove a single file
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory and everything below it
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// Free disk space oracle
#[async_trait]
pub trait SpaceOracle: Send + Sync {
    /// Free space in kilobytes on the volume holding `path`
    async fn free_space_kb(&self, path: &Path) -> Result<u64>;
}

/// Event produced by a running transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// Bytes received so far
    Progress(Progress),
    /// Terminal outcome; no events follow
    Finished(std::result::Result<(), TransferError>),
}

/// Handle to a running transfer
pub struct TransferHandle {
    events: mpsc::Receiver<TransferEvent>,
    cancel: CancellationToken,
}

impl TransferHandle {
    /// Wrap an event channel and the token that aborts the transfer
    pub fn new(events: mpsc::Receiver<TransferEvent>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// Next event, or `None` once the executor is gone
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        self.events.recv().await
    }

    /// Ask the executor to stop the transfer
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Abort and wait until the executor has finished cleaning up
    ///
    /// Returns once the `Finished` event arrives or the executor is gone.
    pub async fn abort_and_wait(&mut self) {
        self.abort();
        while let Some(event) = self.events.recv().await {
            if matches!(event, TransferEvent::Finished(_)) {
                break;
            }
        }
    }

    /// Whether `abort` has been called
    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Network transfer executor
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    /// Start downloading `url` into `dest`
    ///
    /// The executor reports progress and exactly one `Finished` event through
    /// the returned handle. It must stop when the handle is aborted.
    async fn start(
        &self,
        url: &str,
        dest: &Path,
        headers: &HashMap<String, String>,
    ) -> Result<TransferHandle>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Event produced by a running extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractEvent {
    /// Bytes written so far
    Progress(Progress),
    /// Terminal outcome with the raw failure reason; no events follow
    Finished(std::result::Result<(), String>),
}

/// Handle to a running extraction
pub struct ExtractHandle {
    events: mpsc::Receiver<ExtractEvent>,
}

impl ExtractHandle {
    /// Wrap an event channel
    pub fn new(events: mpsc::Receiver<ExtractEvent>) -> Self {
        Self { events }
    }

    /// Next event, or `None` once the extractor is gone
    pub async fn next_event(&mut self) -> Option<ExtractEvent> {
        self.events.recv().await
    }
}

/// Archive decompression executor
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Start extracting `archive` into the directory `dest`
    async fn start(&self, archive: &Path, dest: &Path) -> Result<ExtractHandle>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Two-button confirmation dialog
#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    /// Show the dialog and return the pressed button (1-based)
    ///
    /// Returns 0 when the dialog was dismissed without a choice.
    async fn confirm(&self, title: &str, message: &str, buttons: [&str; 2]) -> u32;
}

/// Opens files with an external application
#[async_trait]
pub trait FileOpener: Send + Sync {
    /// Open `path`, hinting the content type with `mime_type`
    async fn open(&self, path: &Path, mime_type: &str) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn abort_and_wait_returns_after_executor_cleanup() {
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let cleaned_up = Arc::new(AtomicBool::new(false));

        let executor_cancel = cancel.clone();
        let executor_cleaned_up = cleaned_up.clone();
        tokio::spawn(async move {
            tx.send(TransferEvent::Progress(Progress::new(0, 10)))
                .await
                .unwrap();
            executor_cancel.cancelled().await;
            tokio::task::yield_now().await;
            executor_cleaned_up.store(true, Ordering::SeqCst);
            let _ = tx
                .send(TransferEvent::Finished(Err(TransferError::aborted())))
                .await;
        });

        let mut handle = TransferHandle::new(rx, cancel);
        handle.abort_and_wait().await;

        assert!(handle.is_aborted());
        assert!(cleaned_up.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn abort_and_wait_returns_when_executor_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);

        let mut handle = TransferHandle::new(rx, CancellationToken::new());
        handle.abort_and_wait().await;

        assert!(handle.is_aborted());
    }
}
