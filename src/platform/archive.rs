//! ZIP extraction

use super::traits::{ExtractEvent, ExtractHandle, Extractor};
use crate::error::Result;
use crate::types::Progress;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Buffered progress events per extraction
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// [`Extractor`] for ZIP archives
///
/// Runs on the blocking thread pool. Progress counts uncompressed bytes, so the
/// reported total is the space the extracted tree needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

#[async_trait]
impl Extractor for ZipExtractor {
    async fn start(&self, archive: &Path, dest: &Path) -> Result<ExtractHandle> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let outcome = extract(&archive, &dest, &tx);
            if let Err(reason) = &outcome {
                warn!(archive = %archive.display(), %reason, "ZIP extraction failed");
            }
            let _ = tx.blocking_send(ExtractEvent::Finished(outcome));
        });

        Ok(ExtractHandle::new(rx))
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}

fn extract(
    archive_path: &Path,
    dest: &Path,
    tx: &mpsc::Sender<ExtractEvent>,
) -> std::result::Result<(), String> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| format!("failed to open ZIP archive: {e}"))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| format!("failed to read ZIP archive: {e}"))?;

    let mut total = 0u64;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| format!("failed to read ZIP entry: {e}"))?;
        total = total.saturating_add(entry.size());
    }

    std::fs::create_dir_all(dest).map_err(|e| format!("failed to create destination: {e}"))?;
    report(tx, Progress::new(0, total))?;

    let mut loaded = 0u64;
    let mut extracted = 0usize;
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| format!("failed to read ZIP entry: {e}"))?;
        if let Some(written) = extract_entry(entry, dest)? {
            loaded = loaded.saturating_add(written);
            extracted += 1;
            report(tx, Progress::new(loaded, total))?;
        }
    }

    info!(
        archive = %archive_path.display(),
        extracted,
        bytes = loaded,
        "ZIP extraction successful"
    );
    Ok(())
}

/// Write one entry below `dest`; returns the bytes written for files
fn extract_entry(
    mut entry: zip::read::ZipFile,
    dest: &Path,
) -> std::result::Result<Option<u64>, String> {
    let path: PathBuf = match entry.enclosed_name() {
        Some(name) => dest.join(name),
        None => {
            warn!(name = entry.name(), "skipping entry with unsafe path");
            return Ok(None);
        }
    };

    if entry.is_dir() {
        std::fs::create_dir_all(&path)
            .map_err(|e| format!("failed to create directory '{}': {e}", path.display()))?;
        return Ok(None);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create directory '{}': {e}", parent.display()))?;
    }
    let mut out = std::fs::File::create(&path)
        .map_err(|e| format!("failed to create '{}': {e}", path.display()))?;
    let written = std::io::copy(&mut entry, &mut out)
        .map_err(|e| format!("failed to extract '{}': {e}", path.display()))?;

    debug!(path = %path.display(), bytes = written, "extracted entry");
    Ok(Some(written))
}

fn report(tx: &mpsc::Sender<ExtractEvent>, progress: Progress) -> std::result::Result<(), String> {
    tx.blocking_send(ExtractEvent::Progress(progress))
        .map_err(|_| "extraction abandoned by receiver".to_string())
}
