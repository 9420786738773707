//! Platform services behind the factory
//!
//! [`traits`] defines the seams; the other modules are the default
//! implementations used by [`FileFactory::new`](crate::FileFactory::new).

pub mod archive;
pub mod console;
pub mod http;
pub mod local;
pub mod opener;
pub mod traits;

pub use archive::ZipExtractor;
pub use console::ConsoleConfirm;
pub use http::HttpTransfer;
pub use local::LocalFileSystem;
pub use opener::SystemOpener;
pub use traits::{
    ConfirmDialog, ExtractEvent, ExtractHandle, Extractor, FileOpener, FileSystem, ResolvedEntry,
    SpaceOracle, TransferEvent, TransferExecutor, TransferHandle,
};
