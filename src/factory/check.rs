//! Existence checks and free disk space.

use crate::error::{Error, Result};
use crate::types::{EntryKind, Existence, PathSpec};
use std::path::Path;

use super::FileFactory;

impl FileFactory {
    /// Check whether an entry exists and what kind it is
    ///
    /// # Errors
    ///
    /// - [`Error::IllegalName`] (code 4) if the name starts with a path
    ///   separator; nothing is resolved in that case
    /// - [`Error::NotFileOrDirectory`] (code 5) if the entry is something else
    ///   (socket, device, ...)
    /// - Any other resolver failure, unchanged
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use file_factory::*;
    /// # async fn example(factory: FileFactory) -> Result<()> {
    /// let existence = factory.check_file(&PathSpec::new("/docs/", "report.pdf")).await?;
    /// if existence.is_file() {
    ///     println!("already downloaded");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn check_file(&self, spec: &PathSpec) -> Result<Existence> {
        spec.validate()?;
        self.existence_at(&self.full_path(spec)).await
    }

    /// Free space in kilobytes on the volume holding the root
    pub async fn free_disk_space(&self) -> Result<u64> {
        self.space.free_space_kb(&self.root).await
    }

    pub(crate) async fn existence_at(&self, path: &Path) -> Result<Existence> {
        match self.fs.resolve(path).await? {
            None => Ok(Existence::Absent),
            Some(entry) if entry.is_file => Ok(Existence::Present {
                kind: EntryKind::File,
            }),
            Some(entry) if entry.is_dir => Ok(Existence::Present {
                kind: EntryKind::Directory,
            }),
            Some(_) => Err(Error::NotFileOrDirectory {
                path: path.to_path_buf(),
            }),
        }
    }
}
