//! Local file system and disk space

use super::traits::{FileSystem, ResolvedEntry, SpaceOracle};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// [`FileSystem`] and [`SpaceOracle`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn resolve(&self, path: &Path) -> Result<Option<ResolvedEntry>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(Some(ResolvedEntry {
                is_file: metadata.is_file(),
                is_dir: metadata.is_dir(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to resolve '{}': {}", path.display(), e),
            ))),
        }
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "removing file");
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "removing directory recursively");
        tokio::fs::remove_dir_all(path).await?;
        Ok(())
    }
}

#[async_trait]
impl SpaceOracle for LocalFileSystem {
    async fn free_space_kb(&self, path: &Path) -> Result<u64> {
        let owned = path.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || available_space(&owned))
            .await
            .map_err(|e| Error::DiskSpaceCheckFailed(format!("disk space task panicked: {e}")))?
            .map_err(|e| {
                Error::DiskSpaceCheckFailed(format!("{}: {}", path.display(), e))
            })?;
        Ok(bytes / 1024)
    }
}

/// Available disk space in bytes for the volume holding `path`
///
/// Uses `statvfs` on unix and `GetDiskFreeSpaceExW` on Windows.
pub fn available_space(path: &Path) -> std::io::Result<u64> {
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid NUL-terminated string, stat is zero-initialized
        // and only read after statvfs reports success.
        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            // f_bavail: blocks available to unprivileged users
            #[allow(clippy::unnecessary_cast)]
            let available = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
            Ok(available)
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::fileapi::GetDiskFreeSpaceExW;

        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide_path is NUL-terminated and every out pointer refers to a
        // live, aligned u64 that is only read after a successful call.
        unsafe {
            let mut free_bytes_available: u64 = 0;
            let mut total_bytes: u64 = 0;
            let mut total_free_bytes: u64 = 0;

            if GetDiskFreeSpaceExW(
                wide_path.as_ptr(),
                &mut free_bytes_available as *mut u64 as *mut _,
                &mut total_bytes as *mut u64 as *mut _,
                &mut total_free_bytes as *mut u64 as *mut _,
            ) == 0
            {
                return Err(std::io::Error::last_os_error());
            }

            Ok(free_bytes_available)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = path;
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "disk space checking is not supported on this platform",
        ))
    }
}
