//! Core types for file-factory

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf, is_separator};

/// A file-system entry addressed relative to the configured root
///
/// `dir` is a directory below the root (leading separators are ignored) and
/// `name` is the entry inside it. `name` must not start with a path separator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSpec {
    /// Directory relative to the root (e.g. "/docs/")
    pub dir: String,
    /// Entry name inside `dir` (e.g. "report.pdf")
    pub name: String,
}

impl PathSpec {
    /// Create a new PathSpec
    pub fn new(dir: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    /// Reject names that start with a path separator
    pub fn validate(&self) -> Result<()> {
        if self.name.starts_with(is_separator) {
            return Err(Error::IllegalName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Full path of the entry below `root`
    pub fn resolve_in(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        let dir = self.dir.trim_start_matches(is_separator);
        if !dir.is_empty() {
            path.push(dir);
        }
        if !self.name.is_empty() {
            path.push(&self.name);
        }
        path
    }
}

impl std::fmt::Display for PathSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.dir, self.name)
    }
}

/// Kind of an existing entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Outcome of an existence check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Existence {
    /// Nothing exists at the path
    Absent,
    /// An entry of the given kind exists
    Present {
        /// Kind of the entry
        kind: EntryKind,
    },
}

impl Existence {
    /// Whether an entry exists
    pub fn is_present(&self) -> bool {
        matches!(self, Existence::Present { .. })
    }

    /// Whether the entry is a regular file
    pub fn is_file(&self) -> bool {
        matches!(
            self,
            Existence::Present {
                kind: EntryKind::File
            }
        )
    }

    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        matches!(
            self,
            Existence::Present {
                kind: EntryKind::Directory
            }
        )
    }
}

/// A progress tick reported by a transfer or extraction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Bytes processed so far
    pub loaded: u64,
    /// Total bytes, 0 when unknown
    pub total: u64,
}

impl Progress {
    /// Create a progress tick
    pub fn new(loaded: u64, total: u64) -> Self {
        Self { loaded, total }
    }

    /// Rounded completion percentage in `0..=100` (0 while the total is unknown)
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.loaded as f64 / self.total as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Result of a successful deletion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removed {
    /// Always `true`
    pub success: bool,
    /// Full path of the removed entry
    pub path: PathBuf,
    /// Kind of the removed entry
    pub kind: EntryKind,
}

/// Optional collaborators a [`FileFactory`](crate::FileFactory) can be built with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Network transfers (`download_file`)
    Transfer,
    /// Archive extraction (`unzip_file`)
    Extraction,
    /// User confirmation dialogs (`ask_user`)
    Dialog,
    /// Opening files with an external application (`open_file`)
    Opener,
}

impl Capability {
    /// All optional capabilities
    pub const ALL: [Capability; 4] = [
        Capability::Transfer,
        Capability::Extraction,
        Capability::Dialog,
        Capability::Opener,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Transfer => "transfer",
            Capability::Extraction => "extraction",
            Capability::Dialog => "dialog",
            Capability::Opener => "opener",
        };
        f.write_str(name)
    }
}

/// Which optional collaborators are available
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// A transfer executor is configured
    pub transfer: bool,
    /// An extractor is configured
    pub extraction: bool,
    /// A confirmation dialog is configured
    pub dialog: bool,
    /// A file opener is configured
    pub opener: bool,
}

impl Capabilities {
    /// Whether the given capability is available
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Transfer => self.transfer,
            Capability::Extraction => self.extraction,
            Capability::Dialog => self.dialog,
            Capability::Opener => self.opener,
        }
    }

    /// Capabilities that are not available
    pub fn missing(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| !self.has(*c))
            .collect()
    }
}

/// Parameters of a download
#[derive(Debug)]
pub struct DownloadRequest {
    /// Source URL
    pub url: String,
    /// Destination entry
    pub dest: PathSpec,
    /// Log lifecycle and progress at info level
    pub logs: bool,
    /// Receives the latest completion percentage of the first attempt
    pub progress: Option<tokio::sync::watch::Sender<u8>>,
    /// Extra request headers
    pub headers: HashMap<String, String>,
}

impl DownloadRequest {
    /// Create a download request without progress sink or headers
    pub fn new(url: impl Into<String>, dest: PathSpec) -> Self {
        Self {
            url: url.into(),
            dest,
            logs: false,
            progress: None,
            headers: HashMap::new(),
        }
    }

    /// Enable or disable verbose logging
    pub fn logs(mut self, logs: bool) -> Self {
        self.logs = logs;
        self
    }

    /// Publish progress percentages to `sink`
    pub fn progress(mut self, sink: tokio::sync::watch::Sender<u8>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Add a request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Parameters of an archive extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnzipRequest {
    /// Archive to extract
    pub source: PathSpec,
    /// Directory to extract into (must not exist yet)
    pub dest: PathSpec,
    /// Log lifecycle and progress at info level
    pub logs: bool,
}

impl UnzipRequest {
    /// Create an unzip request
    pub fn new(source: PathSpec, dest: PathSpec) -> Self {
        Self {
            source,
            dest,
            logs: false,
        }
    }

    /// Enable or disable verbose logging
    pub fn logs(mut self, logs: bool) -> Self {
        self.logs = logs;
        self
    }
}

/// Event emitted by the factory
///
/// Every event belongs to a single operation; subscribers correlate them by path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A download attempt started
    DownloadStarted {
        /// Source URL
        url: String,
        /// Destination path
        path: PathBuf,
        /// Attempt number (1-based)
        attempt: u32,
    },

    /// Download progress update
    DownloadProgress {
        /// Destination path
        path: PathBuf,
        /// Completion percentage (0 to 100)
        percent: u8,
        /// Bytes received so far
        loaded: u64,
        /// Total bytes, 0 when unknown
        total: u64,
    },

    /// A failed attempt is being retried
    DownloadRetrying {
        /// Destination path
        path: PathBuf,
        /// Number of the attempt that is about to start
        attempt: u32,
        /// Failure of the previous attempt
        error: String,
    },

    /// Download finished successfully
    DownloadComplete {
        /// Destination path
        path: PathBuf,
        /// Duration of the successful attempt in milliseconds
        elapsed_ms: u64,
    },

    /// Download failed for good
    DownloadFailed {
        /// Destination path
        path: PathBuf,
        /// Error message
        error: String,
        /// Taxonomy code, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<u8>,
    },

    /// Extraction started
    ExtractStarted {
        /// Archive path
        archive: PathBuf,
        /// Destination directory
        dest: PathBuf,
    },

    /// Extraction progress update
    ExtractProgress {
        /// Archive path
        archive: PathBuf,
        /// Completion percentage (0 to 100)
        percent: u8,
        /// Bytes written so far
        loaded: u64,
        /// Total bytes, 0 when unknown
        total: u64,
    },

    /// Extraction finished successfully
    ExtractComplete {
        /// Archive path
        archive: PathBuf,
        /// Destination directory
        dest: PathBuf,
        /// Duration in milliseconds
        elapsed_ms: u64,
    },

    /// Extraction failed
    ExtractFailed {
        /// Archive path
        archive: PathBuf,
        /// Error message
        error: String,
        /// Taxonomy code, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<u8>,
    },

    /// An entry was deleted
    Removed {
        /// Full path of the entry
        path: PathBuf,
        /// Kind of the entry
        kind: EntryKind,
    },
}
