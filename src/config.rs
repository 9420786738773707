//! Configuration types for file-factory

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for [`FileFactory`](crate::FileFactory)
///
/// Every field has a default, so an empty JSON/TOML document is a valid config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Where PathSpecs are resolved from
    #[serde(default)]
    pub root: RootConfig,

    /// HTTP transfer settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Automatic retry of failed downloads
    #[serde(default)]
    pub retry: RetryConfig,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: RootConfig::default(),
            transfer: TransferConfig::default(),
            retry: RetryConfig::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer == 0 {
            return Err(Error::Config {
                message: "event_buffer must be greater than zero".to_string(),
                key: Some("event_buffer".to_string()),
            });
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(Error::Config {
                message: format!(
                    "backoff_multiplier must be at least 1.0, got {}",
                    self.retry.backoff_multiplier
                ),
                key: Some("retry.backoff_multiplier".to_string()),
            });
        }
        if self.root.path.is_none() && self.root.app_name.trim().is_empty() {
            return Err(Error::Config {
                message: "app_name is required when no explicit root path is set".to_string(),
                key: Some("root.app_name".to_string()),
            });
        }
        Ok(())
    }
}

/// Root directory configuration
///
/// The root is resolved once, when the factory is built. With no explicit
/// `path`, the platform default is used:
/// - Android: external app storage (`$EXTERNAL_STORAGE/Android/data/<app>/files`),
///   falling back to internal app storage (`/data/data/<app>/files`)
/// - iOS: the app's Documents directory
/// - Desktop: `<local data dir>/<app>`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootConfig {
    /// Explicit root directory (overrides platform detection)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Application identifier used to build platform default paths
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            path: None,
            app_name: default_app_name(),
        }
    }
}

impl RootConfig {
    /// Resolve the root directory for the current platform
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        Platform::current()
            .default_root(&self.app_name)
            .ok_or_else(|| Error::Config {
                message: format!(
                    "could not determine a default root for platform {:?}",
                    Platform::current()
                ),
                key: Some("root.path".to_string()),
            })
    }
}

/// Platform the library is running on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Android
    Android,
    /// iOS
    Ios,
    /// Any desktop or server OS
    Desktop,
}

impl Platform {
    /// Platform of the current build target
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Desktop
        }
    }

    /// Default root directory for `app_name` on this platform
    pub fn default_root(self, app_name: &str) -> Option<PathBuf> {
        match self {
            Platform::Android => {
                let external = std::env::var_os("EXTERNAL_STORAGE").map(|storage| {
                    PathBuf::from(storage)
                        .join("Android")
                        .join("data")
                        .join(app_name)
                        .join("files")
                });
                external.or_else(|| Some(PathBuf::from("/data/data").join(app_name).join("files")))
            }
            Platform::Ios => dirs::home_dir().map(|home| home.join("Documents")),
            Platform::Desktop => dirs::data_local_dir().map(|dir| dir.join(app_name)),
        }
    }
}

/// HTTP transfer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Connect timeout (None = no timeout)
    #[serde(default, with = "optional_duration_serde")]
    pub connect_timeout: Option<Duration>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: None,
        }
    }
}

/// Retry configuration for failed downloads
///
/// The defaults restart a failed download once, immediately.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Automatic retries after the first failed attempt (default: 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry (default: 0 seconds)
    #[serde(default, with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay: Duration::ZERO,
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

fn default_event_buffer() -> usize {
    256
}

fn default_app_name() -> String {
    "file-factory".to_string()
}

fn default_user_agent() -> String {
    format!("file-factory/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_retries() -> u32 {
    1
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper (as whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
