//! Downloads with a free-space guard and automatic retry.

use crate::error::{Error, Result, TransferError, TransferErrorCode};
use crate::platform::{TransferEvent, TransferExecutor};
use crate::retry::{IsRetryable, retry_delay};
use crate::types::{Capability, DownloadRequest, Event, Progress};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tokio::sync::watch;
use tracing::warn;

use super::FileFactory;

/// Bookkeeping for one download attempt
#[derive(Debug)]
pub(crate) struct TransferState {
    /// Attempt number (1-based)
    pub(crate) attempt: u32,
    /// Bytes received so far
    pub(crate) loaded: u64,
    /// Total reported by the executor, `None` until the first progress event
    pub(crate) total: Option<u64>,
    /// The space guard has run for this attempt
    pub(crate) space_checked: bool,
}

impl TransferState {
    pub(crate) fn new(attempt: u32) -> Self {
        Self {
            attempt,
            loaded: 0,
            total: None,
            space_checked: false,
        }
    }

    /// Run the space guard on the first progress event only
    ///
    /// Returns the bytes that do not fit, if any. An unknown total (0) fits.
    fn guard_space(&mut self, progress: Progress, free_bytes: u64) -> Option<u64> {
        if self.space_checked {
            return None;
        }
        self.space_checked = true;
        (progress.total > free_bytes).then_some(progress.total)
    }

    fn record(&mut self, progress: Progress) {
        self.loaded = progress.loaded;
        self.total = Some(progress.total);
    }
}

/// Arguments shared by every attempt of one download
struct Attempt<'a> {
    transfer: &'a dyn TransferExecutor,
    url: &'a str,
    path: &'a Path,
    headers: &'a HashMap<String, String>,
    logs: bool,
    sink: Option<&'a watch::Sender<u8>>,
}

impl FileFactory {
    /// Download a URL into an entry that must not exist yet
    ///
    /// The free disk space is compared with the size the server reports on the
    /// first progress update; the transfer is aborted if it does not fit.
    /// Progress percentages go to the request's progress sink and to
    /// [`Event::DownloadProgress`].
    ///
    /// A retryable failure restarts the whole operation, existence check
    /// included, up to `retry.max_retries` times. Retries run without the
    /// progress sink.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCapability`] if no transfer executor is configured
    /// - [`Error::IllegalName`] (code 4) for an invalid destination name
    /// - [`Error::AlreadyExists`] (code 1) if the destination exists
    /// - [`Error::InsufficientSpace`] (code 3) if the download does not fit
    /// - [`Error::Offline`] (code 6) if the device has no connectivity
    /// - [`Error::DownloadFailed`] once every attempt failed
    /// - [`Error::Transfer`] for a failure that is not retried (abort)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use file_factory::*;
    /// # async fn example(factory: FileFactory) -> Result<()> {
    /// let (tx, mut rx) = tokio::sync::watch::channel(0u8);
    /// let request = DownloadRequest::new(
    ///     "https://example.com/report.pdf",
    ///     PathSpec::new("/docs/", "report.pdf"),
    /// )
    /// .header("Authorization", "Bearer token")
    /// .progress(tx);
    ///
    /// tokio::spawn(async move {
    ///     while rx.changed().await.is_ok() {
    ///         println!("{}%", *rx.borrow());
    ///     }
    /// });
    /// factory.download_file(request).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download_file(&self, request: DownloadRequest) -> Result<()> {
        let transfer = Self::require(&self.transfer, Capability::Transfer)?;
        request.dest.validate()?;
        let path = self.full_path(&request.dest);

        let result = self.run_download(transfer.as_ref(), &path, request).await;
        if let Err(e) = &result {
            warn!(path = %path.display(), error = %e, "download failed");
            self.emit_event(Event::DownloadFailed {
                path: path.clone(),
                error: e.to_string(),
                code: e.code().map(|c| c.as_u8()),
            });
        }
        result
    }

    async fn run_download(
        &self,
        transfer: &dyn TransferExecutor,
        path: &Path,
        request: DownloadRequest,
    ) -> Result<()> {
        let DownloadRequest {
            url,
            logs,
            mut progress,
            headers,
            ..
        } = request;
        let max_attempts = self.config.retry.max_retries.saturating_add(1);

        let mut attempt = 1;
        loop {
            let mut state = TransferState::new(attempt);
            let started = Instant::now();
            let args = Attempt {
                transfer,
                url: &url,
                path,
                headers: &headers,
                logs,
                sink: progress.as_ref(),
            };

            let failure = match self.download_attempt(&args, &mut state).await? {
                Ok(()) => {
                    verbose!(
                        logs,
                        path = %path.display(),
                        bytes = state.loaded,
                        total = ?state.total,
                        attempt,
                        "download complete"
                    );
                    self.emit_event(Event::DownloadComplete {
                        path: path.to_path_buf(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                    return Ok(());
                }
                Err(failure) => failure,
            };

            if failure.is_offline() {
                return Err(Error::Offline { url });
            }
            if !failure.is_retryable() {
                return Err(Error::Transfer(failure));
            }
            if attempt >= max_attempts {
                return Err(Error::DownloadFailed {
                    attempts: attempt,
                    source: failure,
                });
            }

            attempt += 1;
            warn!(
                path = %path.display(),
                attempt,
                error = %failure,
                "download attempt failed, retrying"
            );
            self.emit_event(Event::DownloadRetrying {
                path: path.to_path_buf(),
                attempt,
                error: failure.to_string(),
            });
            progress = None;

            let delay = retry_delay(&self.config.retry, attempt - 1);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Run one attempt
    ///
    /// The outer error ends the download; the inner one is the transfer failure
    /// the retry policy decides on.
    async fn download_attempt(
        &self,
        args: &Attempt<'_>,
        state: &mut TransferState,
    ) -> Result<std::result::Result<(), TransferError>> {
        if self.existence_at(args.path).await?.is_present() {
            return Err(Error::AlreadyExists {
                path: args.path.to_path_buf(),
            });
        }

        let free_bytes = self.space.free_space_kb(&self.root).await?.saturating_mul(1024);

        verbose!(
            args.logs,
            url = args.url,
            path = %args.path.display(),
            attempt = state.attempt,
            transfer = args.transfer.name(),
            "starting download"
        );
        self.emit_event(Event::DownloadStarted {
            url: args.url.to_string(),
            path: args.path.to_path_buf(),
            attempt: state.attempt,
        });

        let mut handle = args
            .transfer
            .start(args.url, args.path, args.headers)
            .await?;

        loop {
            match handle.next_event().await {
                Some(TransferEvent::Progress(progress)) => {
                    if let Some(required) = state.guard_space(progress, free_bytes) {
                        handle.abort_and_wait().await;
                        return Err(Error::InsufficientSpace {
                            required,
                            available: free_bytes,
                        });
                    }
                    state.record(progress);

                    let percent = progress.percent();
                    if let Some(sink) = args.sink {
                        sink.send_replace(percent);
                    }
                    verbose!(
                        args.logs,
                        path = %args.path.display(),
                        percent,
                        loaded = progress.loaded,
                        total = progress.total,
                        "downloading"
                    );
                    self.emit_event(Event::DownloadProgress {
                        path: args.path.to_path_buf(),
                        percent,
                        loaded: progress.loaded,
                        total: progress.total,
                    });
                }
                Some(TransferEvent::Finished(Ok(()))) => return Ok(Ok(())),
                Some(TransferEvent::Finished(Err(failure))) => {
                    if failure.is_offline() {
                        handle.abort();
                    }
                    return Ok(Err(failure));
                }
                None => {
                    return Ok(Err(TransferError::new(
                        TransferErrorCode::Local,
                        "transfer executor stopped without reporting an outcome",
                    )));
                }
            }
        }
    }
}
