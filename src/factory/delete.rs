//! File and directory removal.

use crate::error::{Error, Result};
use crate::types::{EntryKind, Event, Existence, PathSpec, Removed};

use super::FileFactory;

impl FileFactory {
    /// Remove a file, or a directory with everything below it
    ///
    /// # Errors
    ///
    /// - [`Error::IllegalName`] (code 4) for an invalid name
    /// - [`Error::NotFound`] (code 2) if nothing exists at the path
    /// - Removal failures, unchanged
    pub async fn delete_file(&self, spec: &PathSpec, logs: bool) -> Result<Removed> {
        spec.validate()?;
        let path = self.full_path(spec);

        let kind = match self.existence_at(&path).await? {
            Existence::Absent => return Err(Error::NotFound { path }),
            Existence::Present { kind } => kind,
        };

        match kind {
            EntryKind::File => self.fs.remove_file(&path).await?,
            EntryKind::Directory => self.fs.remove_dir_all(&path).await?,
        }

        verbose!(logs, path = %path.display(), ?kind, "removed");
        self.emit_event(Event::Removed {
            path: path.clone(),
            kind,
        });

        Ok(Removed {
            success: true,
            path,
            kind,
        })
    }
}
