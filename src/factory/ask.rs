//! Two-button user confirmation.

use crate::error::Result;
use crate::types::Capability;
use tracing::debug;

use super::FileFactory;

impl FileFactory {
    /// Ask the user to pick one of two buttons
    ///
    /// Returns `true` only if the first button was picked. Dismissing the
    /// dialog counts as the second answer.
    ///
    /// # Errors
    ///
    /// [`Error::MissingCapability`](crate::Error::MissingCapability) if no
    /// dialog is configured.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use file_factory::*;
    /// # async fn example(factory: FileFactory) -> Result<()> {
    /// if factory.ask_user("Delete", "Delete all downloads?", "Yes", "No").await? {
    ///     factory.delete_file(&PathSpec::new("/", "downloads"), true).await?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ask_user(
        &self,
        title: &str,
        message: &str,
        first_button: &str,
        second_button: &str,
    ) -> Result<bool> {
        let dialog = Self::require(&self.dialog, Capability::Dialog)?;
        let choice = dialog
            .confirm(title, message, [first_button, second_button])
            .await;
        debug!(title, choice, "confirmation answered");
        Ok(choice == 1)
    }
}
