//! Retry policy for failed downloads
//!
//! A failed download attempt is restarted from scratch (existence check
//! included) as long as the failure is retryable and the configured retry
//! budget is not used up. This module decides *whether* to retry and *how long*
//! to wait; the download orchestration drives the attempts.
//!
//! # Example
//!
//! ```
//! use file_factory::config::RetryConfig;
//! use file_factory::retry::retry_delay;
//! use std::time::Duration;
//!
//! let config = RetryConfig {
//!     initial_delay: Duration::from_secs(1),
//!     ..Default::default()
//! };
//! assert_eq!(retry_delay(&config, 1), Duration::from_secs(1));
//! assert_eq!(retry_delay(&config, 2), Duration::from_secs(2));
//! ```

use crate::config::RetryConfig;
use crate::error::{TransferError, TransferErrorCode};
use rand::Rng;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the operation should be attempted again
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for TransferError {
    fn is_retryable(&self) -> bool {
        match self.code {
            // Offline is reported to the caller instead of retried
            TransferErrorCode::Connection => false,
            // Aborts are always deliberate
            TransferErrorCode::Abort => false,
            TransferErrorCode::FileNotFound
            | TransferErrorCode::InvalidUrl
            | TransferErrorCode::NotModified
            | TransferErrorCode::Remote
            | TransferErrorCode::Local => true,
        }
    }
}

/// Delay before retry number `retry` (1-based)
///
/// Grows exponentially from `initial_delay` by `backoff_multiplier`, capped at
/// `max_delay`, with optional jitter on top.
pub fn retry_delay(config: &RetryConfig, retry: u32) -> Duration {
    if config.initial_delay.is_zero() {
        return Duration::ZERO;
    }

    let exponent = retry.saturating_sub(1) as i32;
    let secs = config.initial_delay.as_secs_f64() * config.backoff_multiplier.powi(exponent);
    let delay = Duration::try_from_secs_f64(secs.min(config.max_delay.as_secs_f64()))
        .unwrap_or(config.max_delay);

    if config.jitter {
        add_jitter(delay)
    } else {
        delay
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The result lies between `delay` and `2 * delay`, saturating at `Duration::MAX`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
        .unwrap_or(Duration::MAX)
}
