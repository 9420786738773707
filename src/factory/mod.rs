//! The file factory: orchestration of file operations over platform services.
//!
//! `FileFactory` methods are organized by operation:
//! - [`check`] - Existence checks and free disk space
//! - [`download`] - Downloads with space guard and automatic retry
//! - [`unzip`] - Archive extraction with space-aware failure reporting
//! - [`delete`] - File and directory removal
//! - [`ask`] - Two-button user confirmation
//! - [`open`] - Opening files with an external application

/// Log at info when the caller asked for logs, at debug otherwise
macro_rules! verbose {
    ($logs:expr, $($arg:tt)+) => {
        if $logs {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

mod ask;
mod check;
mod delete;
mod download;
mod open;
mod unzip;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::{
    ConfirmDialog, Extractor, FileOpener, FileSystem, HttpTransfer, LocalFileSystem, SpaceOracle,
    SystemOpener, TransferExecutor, ZipExtractor,
};
use crate::types::{Capabilities, Capability, Event, PathSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// File operation orchestrator (cloneable - all fields are Arc-wrapped)
///
/// Every operation addresses entries with a [`PathSpec`] relative to the root
/// directory, which is resolved once when the factory is built.
#[derive(Clone)]
pub struct FileFactory {
    /// Root directory all PathSpecs are resolved against
    pub(crate) root: Arc<PathBuf>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Existence checks and removal
    pub(crate) fs: Arc<dyn FileSystem>,
    /// Free disk space
    pub(crate) space: Arc<dyn SpaceOracle>,
    /// Network transfers (optional capability)
    pub(crate) transfer: Option<Arc<dyn TransferExecutor>>,
    /// Archive extraction (optional capability)
    pub(crate) extractor: Option<Arc<dyn Extractor>>,
    /// User confirmation (optional capability)
    pub(crate) dialog: Option<Arc<dyn ConfirmDialog>>,
    /// External file opener (optional capability)
    pub(crate) opener: Option<Arc<dyn FileOpener>>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl std::fmt::Debug for FileFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileFactory")
            .field("root", &self.root)
            .field("capabilities", &self.capabilities())
            .finish_non_exhaustive()
    }
}

impl FileFactory {
    /// Create a factory with the default platform services
    ///
    /// Uses the local file system, HTTP transfers, ZIP extraction and the
    /// desktop file launcher when one is installed. No confirmation dialog is
    /// configured; supply one through [`FileFactory::builder`] to use
    /// [`ask_user`](FileFactory::ask_user).
    ///
    /// The root directory is created if it does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use file_factory::*;
    /// # async fn example() -> Result<()> {
    /// let mut config = Config::default();
    /// config.root.path = Some("/tmp/files".into());
    ///
    /// let factory = FileFactory::new(config).await?;
    /// let free_kb = factory.free_disk_space().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: Config) -> Result<Self> {
        let transfer = HttpTransfer::new(&config.transfer)?;

        let mut builder = Self::builder(config)
            .transfer(Arc::new(transfer))
            .extractor(Arc::new(ZipExtractor));
        if let Some(opener) = SystemOpener::detect() {
            builder = builder.opener(Arc::new(opener));
        }
        let factory = builder.build()?;

        tokio::fs::create_dir_all(factory.root.as_path())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create root directory '{}': {}",
                        factory.root.display(),
                        e
                    ),
                ))
            })?;

        Ok(factory)
    }

    /// Start building a factory with custom platform services
    pub fn builder(config: Config) -> FileFactoryBuilder {
        FileFactoryBuilder::new(config)
    }

    /// Root directory PathSpecs are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full path of `spec` below the root
    pub fn full_path(&self, spec: &PathSpec) -> PathBuf {
        spec.resolve_in(&self.root)
    }

    /// Subscribe to operation events
    ///
    /// Each subscriber receives every event emitted after it subscribed. Slow
    /// subscribers lag and lose the oldest events once `event_buffer` fills up.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Optional services this factory was built with
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            transfer: self.transfer.is_some(),
            extraction: self.extractor.is_some(),
            dialog: self.dialog.is_some(),
            opener: self.opener.is_some(),
        }
    }

    /// Optional services this factory lacks
    pub fn missing_capabilities(&self) -> Vec<Capability> {
        self.capabilities().missing()
    }

    /// Emit an event to all subscribers
    ///
    /// Events are dropped when nobody is subscribed.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Fail with `MissingCapability` when `service` is not configured
    pub(crate) fn require<T: ?Sized>(
        service: &Option<Arc<T>>,
        capability: Capability,
    ) -> Result<Arc<T>> {
        service
            .clone()
            .ok_or(Error::MissingCapability(capability))
    }
}

/// Builder for [`FileFactory`]
///
/// The file system and space oracle default to [`LocalFileSystem`]; all other
/// services are optional and absent unless set.
pub struct FileFactoryBuilder {
    config: Config,
    root: Option<PathBuf>,
    fs: Option<Arc<dyn FileSystem>>,
    space: Option<Arc<dyn SpaceOracle>>,
    transfer: Option<Arc<dyn TransferExecutor>>,
    extractor: Option<Arc<dyn Extractor>>,
    dialog: Option<Arc<dyn ConfirmDialog>>,
    opener: Option<Arc<dyn FileOpener>>,
}

impl FileFactoryBuilder {
    fn new(config: Config) -> Self {
        Self {
            config,
            root: None,
            fs: None,
            space: None,
            transfer: None,
            extractor: None,
            dialog: None,
            opener: None,
        }
    }

    /// Use `root` instead of the configured or platform default root
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// File system used for existence checks and removal
    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Oracle used for free disk space
    pub fn space_oracle(mut self, space: Arc<dyn SpaceOracle>) -> Self {
        self.space = Some(space);
        self
    }

    /// Transfer executor used by `download_file`
    pub fn transfer(mut self, transfer: Arc<dyn TransferExecutor>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Extractor used by `unzip_file`
    pub fn extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Dialog used by `ask_user`
    pub fn dialog(mut self, dialog: Arc<dyn ConfirmDialog>) -> Self {
        self.dialog = Some(dialog);
        self
    }

    /// Opener used by `open_file`
    pub fn opener(mut self, opener: Arc<dyn FileOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Validate the configuration, resolve the root and build the factory
    ///
    /// Does not touch the file system; the root is not created.
    pub fn build(self) -> Result<FileFactory> {
        self.config.validate()?;

        let root = match self.root {
            Some(root) => root,
            None => self.config.root.resolve()?,
        };

        let (event_tx, _rx) = tokio::sync::broadcast::channel(self.config.event_buffer);

        let factory = FileFactory {
            root: Arc::new(root),
            config: Arc::new(self.config),
            fs: self.fs.unwrap_or_else(|| Arc::new(LocalFileSystem)),
            space: self.space.unwrap_or_else(|| Arc::new(LocalFileSystem)),
            transfer: self.transfer,
            extractor: self.extractor,
            dialog: self.dialog,
            opener: self.opener,
            event_tx,
        };

        let missing = factory.missing_capabilities();
        info!(
            root = %factory.root.display(),
            transfer = factory.transfer.as_ref().map(|t| t.name()),
            extractor = factory.extractor.as_ref().map(|e| e.name()),
            opener = factory.opener.as_ref().map(|o| o.name()),
            "file factory ready"
        );
        if !missing.is_empty() {
            warn!(?missing, "file factory built without some capabilities");
        }

        Ok(factory)
    }
}
