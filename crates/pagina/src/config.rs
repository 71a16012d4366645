//! Runtime settings for verb execution and waits.
//!
//! Pagina never reads configuration files; the host constructs a
//! [`Settings`] value (possibly deserialized from its own config layer) and
//! passes it into the page builder. No ambient statics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout applied to waits when the caller supplies none (10s)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval for bounded waits (200ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Settings governing verb execution and the polling wait primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Default timeout in milliseconds for waits without an explicit timeout
    pub default_timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Whether clicks first wait for the element to be stationary and enabled
    pub wait_for_still_element: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_for_still_element: true,
        }
    }
}

impl Settings {
    /// Create settings with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default wait timeout in milliseconds
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Enable or disable the pre-click stability wait
    #[must_use]
    pub const fn with_wait_for_still_element(mut self, enabled: bool) -> Self {
        self.wait_for_still_element = enabled;
        self
    }

    /// Default timeout as a [`Duration`]
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
