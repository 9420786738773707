//! Error types for file-factory
//!
//! This module provides the error handling for the library:
//! - The stable numeric taxonomy ([`ErrorCode`]) callers match on
//! - The transfer-level failure reported by a [`TransferExecutor`](crate::platform::TransferExecutor)
//! - A serializable `{ code, text }` form for handing errors across an FFI or UI boundary

use crate::types::Capability;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for file-factory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes surfaced to callers
///
/// The numeric values are part of the public contract and never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Destination already exists
    AlreadyExists = 1,
    /// File or directory not found
    NotFound = 2,
    /// Not enough free disk space
    InsufficientSpace = 3,
    /// Entry name starts with a path separator
    IllegalName = 4,
    /// Resolved entry is neither a file nor a directory
    NotFileOrDirectory = 5,
    /// Transfer aborted because the device is offline
    Offline = 6,
}

impl ErrorCode {
    /// Numeric value of the code
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Main error type for file-factory
#[derive(Debug, Error)]
pub enum Error {
    /// The destination entry is already present
    #[error("there is already a file with the same name: {path}")]
    AlreadyExists {
        /// Full path of the existing entry
        path: PathBuf,
    },

    /// The requested entry does not exist
    #[error("file not found: {path}")]
    NotFound {
        /// Full path that was looked up
        path: PathBuf,
    },

    /// Not enough free space for the transfer or extraction
    #[error("not enough space in disk: need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        /// Bytes reported by the collaborator as the total size
        required: u64,
        /// Bytes free on the target volume
        available: u64,
    },

    /// An entry name starts with a path separator
    #[error("file/directory cannot start with a path separator: {name}")]
    IllegalName {
        /// The rejected name
        name: String,
    },

    /// The entry exists but is neither a regular file nor a directory
    #[error("input is not a file or directory: {path}")]
    NotFileOrDirectory {
        /// Full path of the entry
        path: PathBuf,
    },

    /// The transfer failed because the device lost connectivity
    #[error("device offline while downloading {url}")]
    Offline {
        /// URL being downloaded
        url: String,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "root.path")
        key: Option<String>,
    },

    /// An operation needs a collaborator that was not configured
    #[error("missing capability: {0}")]
    MissingCapability(Capability),

    /// Failed to check disk space
    #[error("failed to check disk space: {0}")]
    DiskSpaceCheckFailed(String),

    /// A single transfer attempt failed
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Download failed after all automatic attempts were used
    #[error("download failed after {attempts} attempt(s): {source}")]
    DownloadFailed {
        /// Number of attempts that were made
        attempts: u32,
        /// Failure reported by the last attempt
        #[source]
        source: TransferError,
    },

    /// The extractor reported a failure
    #[error("extraction failed for {archive}: {reason}")]
    Extraction {
        /// Archive being extracted
        archive: PathBuf,
        /// Raw failure reported by the extractor
        reason: String,
    },

    /// The file opener could not open the entry
    #[error("failed to open {path}: {reason}")]
    Open {
        /// Full path of the entry
        path: PathBuf,
        /// Reason reported by the opener
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable taxonomy code, if this error belongs to the taxonomy
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::AlreadyExists { .. } => Some(ErrorCode::AlreadyExists),
            Error::NotFound { .. } => Some(ErrorCode::NotFound),
            Error::InsufficientSpace { .. } => Some(ErrorCode::InsufficientSpace),
            Error::IllegalName { .. } => Some(ErrorCode::IllegalName),
            Error::NotFileOrDirectory { .. } => Some(ErrorCode::NotFileOrDirectory),
            Error::Offline { .. } => Some(ErrorCode::Offline),
            _ => None,
        }
    }

    /// Machine-readable error kind, available for every variant
    pub fn kind(&self) -> &'static str {
        match self {
            Error::AlreadyExists { .. } => "already_exists",
            Error::NotFound { .. } => "not_found",
            Error::InsufficientSpace { .. } => "insufficient_space",
            Error::IllegalName { .. } => "illegal_name",
            Error::NotFileOrDirectory { .. } => "not_file_or_directory",
            Error::Offline { .. } => "offline",
            Error::Config { .. } => "config_error",
            Error::MissingCapability(_) => "missing_capability",
            Error::DiskSpaceCheckFailed(_) => "disk_space_check_failed",
            Error::Transfer(_) => "transfer_error",
            Error::DownloadFailed { .. } => "download_failed",
            Error::Extraction { .. } => "extraction_failed",
            Error::Open { .. } => "open_failed",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}

/// Failure code reported by a transfer executor
///
/// Values follow the file-transfer plugin convention used on mobile platforms,
/// extended with codes for remote and local failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferErrorCode {
    /// Remote resource does not exist
    FileNotFound = 1,
    /// URL or request could not be built
    InvalidUrl = 2,
    /// No connection could be made (device offline)
    Connection = 3,
    /// Transfer was aborted
    Abort = 4,
    /// Remote resource was not modified
    NotModified = 5,
    /// Remote server answered with an error status
    Remote = 6,
    /// Writing the destination failed
    Local = 7,
}

/// A failed transfer attempt
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} (code {code:?})")]
pub struct TransferError {
    /// Failure classification
    pub code: TransferErrorCode,
    /// Human-readable description
    pub message: String,
    /// HTTP status returned by the server, if any
    pub http_status: Option<u16>,
}

impl TransferError {
    /// Create a transfer error without an HTTP status
    pub fn new(code: TransferErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
        }
    }

    /// Create a transfer error from an HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            404 => TransferErrorCode::FileNotFound,
            304 => TransferErrorCode::NotModified,
            _ => TransferErrorCode::Remote,
        };
        Self {
            code,
            message: message.into(),
            http_status: Some(status),
        }
    }

    /// The transfer was aborted before completion
    pub fn aborted() -> Self {
        Self::new(TransferErrorCode::Abort, "transfer aborted")
    }

    /// Whether the failure means the device has no connectivity
    pub fn is_offline(&self) -> bool {
        self.code == TransferErrorCode::Connection
    }
}

/// Structured `{ code, text }` error form
///
/// # Example JSON
///
/// ```json
/// { "code": 1, "kind": "already_exists", "text": "there is already a file with the same name: /root/docs/report.pdf" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Taxonomy code, absent for errors outside the taxonomy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u8>,
    /// Machine-readable kind
    pub kind: String,
    /// Human-readable message
    pub text: String,
}

impl From<&Error> for ErrorDetail {
    fn from(error: &Error) -> Self {
        Self {
            code: error.code().map(ErrorCode::as_u8),
            kind: error.kind().to_string(),
            text: error.to_string(),
        }
    }
}

impl From<Error> for ErrorDetail {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}
