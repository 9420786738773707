//! Opening files with the desktop's default application

use super::traits::FileOpener;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// [`FileOpener`] that hands files to the platform launcher
/// (`open`, `xdg-open` or `cmd /C start`)
#[derive(Debug, Clone)]
pub struct SystemOpener {
    program: PathBuf,
    args: Vec<String>,
}

impl SystemOpener {
    /// Locate the platform launcher on `PATH`
    ///
    /// Returns `None` when no launcher is installed (headless servers, minimal
    /// containers), in which case the factory has no opener capability.
    pub fn detect() -> Option<Self> {
        let (name, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
            ("open", &[])
        } else if cfg!(windows) {
            ("cmd", &["/C", "start", ""])
        } else {
            ("xdg-open", &[])
        };

        match which::which(name) {
            Ok(program) => Some(Self::with_program(program, args)),
            Err(e) => {
                debug!(launcher = name, error = %e, "no file launcher found");
                None
            }
        }
    }

    /// Use an explicit launcher; the file path is appended after `args`
    pub fn with_program(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Launcher executable
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl FileOpener for SystemOpener {
    async fn open(&self, path: &Path, mime_type: &str) -> Result<()> {
        debug!(
            program = %self.program.display(),
            path = %path.display(),
            mime_type,
            "launching file opener"
        );

        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .await
            .map_err(|e| Error::Open {
                path: path.to_path_buf(),
                reason: format!("failed to launch {}: {e}", self.program.display()),
            })?;

        if !status.success() {
            return Err(Error::Open {
                path: path.to_path_buf(),
                reason: format!("{} exited with {status}", self.program.display()),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_launcher_opens() {
        let Ok(program) = which::which("true") else {
            return;
        };
        let opener = SystemOpener::with_program(program, &[]);
        opener
            .open(Path::new("/tmp/report.pdf"), "application/pdf")
            .await
            .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_launcher_is_an_open_error() {
        let Ok(program) = which::which("false") else {
            return;
        };
        let opener = SystemOpener::with_program(program, &[]);
        let err = opener
            .open(Path::new("/tmp/report.pdf"), "application/pdf")
            .await
            .unwrap_err();
        match err {
            Error::Open { path, reason } => {
                assert_eq!(path, PathBuf::from("/tmp/report.pdf"));
                assert!(reason.contains("exited with"), "{reason}");
            }
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_launcher_is_an_open_error() {
        let opener = SystemOpener::with_program("/no/such/launcher", &[]);
        let err = opener
            .open(Path::new("report.pdf"), "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }
}
