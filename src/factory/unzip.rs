//! Archive extraction.

use crate::error::{Error, Result};
use crate::platform::{ExtractEvent, Extractor};
use crate::types::{Capability, Event, UnzipRequest};
use std::path::Path;
use std::time::Instant;
use tracing::warn;

use super::FileFactory;

impl FileFactory {
    /// Extract an existing archive into a directory that must not exist yet
    ///
    /// If the extractor fails after reporting more bytes than were free when
    /// the extraction started, the failure is reported as
    /// [`Error::InsufficientSpace`]; otherwise the extractor's own reason is
    /// returned as [`Error::Extraction`].
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCapability`] if no extractor is configured
    /// - [`Error::IllegalName`] (code 4) for an invalid source or destination name
    /// - [`Error::NotFound`] (code 2) if the archive does not exist
    /// - [`Error::AlreadyExists`] (code 1) if the destination exists
    /// - [`Error::InsufficientSpace`] (code 3) or [`Error::Extraction`] if the
    ///   extractor fails
    pub async fn unzip_file(&self, request: UnzipRequest) -> Result<()> {
        let extractor = Self::require(&self.extractor, Capability::Extraction)?;
        request.source.validate()?;
        request.dest.validate()?;

        let archive = self.full_path(&request.source);
        let dest = self.full_path(&request.dest);

        let result = self
            .run_unzip(extractor.as_ref(), &archive, &dest, request.logs)
            .await;
        if let Err(e) = &result {
            warn!(archive = %archive.display(), error = %e, "extraction failed");
            self.emit_event(Event::ExtractFailed {
                archive: archive.clone(),
                error: e.to_string(),
                code: e.code().map(|c| c.as_u8()),
            });
        }
        result
    }

    async fn run_unzip(
        &self,
        extractor: &dyn Extractor,
        archive: &Path,
        dest: &Path,
        logs: bool,
    ) -> Result<()> {
        if !self.existence_at(archive).await?.is_present() {
            return Err(Error::NotFound {
                path: archive.to_path_buf(),
            });
        }
        if self.existence_at(dest).await?.is_present() {
            return Err(Error::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }

        let free_bytes = self.space.free_space_kb(&self.root).await?.saturating_mul(1024);

        verbose!(
            logs,
            archive = %archive.display(),
            dest = %dest.display(),
            extractor = extractor.name(),
            "starting extraction"
        );
        self.emit_event(Event::ExtractStarted {
            archive: archive.to_path_buf(),
            dest: dest.to_path_buf(),
        });

        let started = Instant::now();
        let mut handle = extractor.start(archive, dest).await?;
        let mut largest_total = 0u64;

        let outcome = loop {
            match handle.next_event().await {
                Some(ExtractEvent::Progress(progress)) => {
                    largest_total = largest_total.max(progress.total);
                    let percent = progress.percent();
                    verbose!(
                        logs,
                        archive = %archive.display(),
                        percent,
                        "extracting"
                    );
                    self.emit_event(Event::ExtractProgress {
                        archive: archive.to_path_buf(),
                        percent,
                        loaded: progress.loaded,
                        total: progress.total,
                    });
                }
                Some(ExtractEvent::Finished(outcome)) => break outcome,
                None => break Err("extractor stopped without reporting an outcome".to_string()),
            }
        };

        match outcome {
            Ok(()) => {
                verbose!(
                    logs,
                    archive = %archive.display(),
                    dest = %dest.display(),
                    bytes = largest_total,
                    "extraction complete"
                );
                self.emit_event(Event::ExtractComplete {
                    archive: archive.to_path_buf(),
                    dest: dest.to_path_buf(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
                Ok(())
            }
            Err(_) if free_bytes < largest_total => Err(Error::InsufficientSpace {
                required: largest_total,
                available: free_bytes,
            }),
            Err(reason) => Err(Error::Extraction {
                archive: archive.to_path_buf(),
                reason,
            }),
        }
    }
}
