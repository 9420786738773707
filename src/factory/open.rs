//! Opening files with an external application.

use crate::error::{Error, Result};
use crate::types::{Capability, PathSpec};

use super::FileFactory;

impl FileFactory {
    /// Open an existing entry with the platform's handler for `mime_type`
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCapability`] if no opener is configured
    /// - [`Error::IllegalName`] (code 4) for an invalid name
    /// - [`Error::NotFound`] (code 2) if the entry does not exist
    /// - Opener failures, unchanged
    pub async fn open_file(&self, spec: &PathSpec, mime_type: &str, logs: bool) -> Result<()> {
        let opener = Self::require(&self.opener, Capability::Opener)?;
        spec.validate()?;
        let path = self.full_path(spec);

        if !self.existence_at(&path).await?.is_present() {
            return Err(Error::NotFound { path });
        }

        verbose!(
            logs,
            path = %path.display(),
            mime_type,
            opener = opener.name(),
            "opening file"
        );
        opener.open(&path, mime_type).await
    }
}
