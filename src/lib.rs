//! # file-factory
//!
//! Async orchestration of file-system, download and archive-extraction
//! operations for applications that manage files below a single root
//! directory (typically an app's data directory on a phone or desktop).
//!
//! ## Design Philosophy
//!
//! file-factory is designed to be:
//! - **Check before act** - Downloads and extractions never overwrite, and fail
//!   early with a stable numeric [`ErrorCode`]
//! - **Space aware** - A download is aborted as soon as the server reports a
//!   size that does not fit on disk
//! - **Pluggable** - Every platform service sits behind a trait in
//!   [`platform`]; defaults cover the local disk, HTTP, ZIP and the desktop
//!   file launcher
//! - **Event-driven** - Consumers subscribe to progress and lifecycle events
//!
//! ## Quick Start
//!
//! ```no_run
//! use file_factory::{Config, DownloadRequest, FileFactory, PathSpec, UnzipRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = FileFactory::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = factory.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     factory
//!         .download_file(
//!             DownloadRequest::new(
//!                 "https://example.com/maps.zip",
//!                 PathSpec::new("/downloads/", "maps.zip"),
//!             )
//!             .logs(true),
//!         )
//!         .await?;
//!
//!     factory
//!         .unzip_file(UnzipRequest::new(
//!             PathSpec::new("/downloads/", "maps.zip"),
//!             PathSpec::new("/", "maps"),
//!         ))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// File operation orchestrator (decomposed into per-operation submodules)
pub mod factory;
/// Platform services and their default implementations
pub mod platform;
/// Retry policy for failed downloads
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, RetryConfig, RootConfig, TransferConfig};
pub use error::{Error, ErrorCode, ErrorDetail, Result, TransferError, TransferErrorCode};
pub use factory::{FileFactory, FileFactoryBuilder};
pub use types::{
    Capabilities, Capability, DownloadRequest, EntryKind, Event, Existence, PathSpec, Progress,
    Removed, UnzipRequest,
};
