//! Bounded polling waits.
//!
//! The only waiting primitive in Pagina is a synchronous poll loop on the
//! calling thread. Native automation layers below this crate frequently
//! assume a single apartment/thread of control, so no async interleaving or
//! background threads are introduced; call ordering between "read state" and
//! "act on state" stays strictly sequential.

use crate::config::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::{PaginaError, PaginaResult};
use std::time::{Duration, Instant};

/// Options for a single wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of predicate evaluations performed
    pub polls: u32,
}

/// Repeatedly evaluate `predicate` until it returns true or `options.timeout`
/// elapses, sleeping `options.poll_interval` between attempts.
///
/// The predicate is evaluated at least once, immediately. On timeout a
/// [`PaginaError::Timeout`] is raised carrying the configured and observed
/// durations; the call site decides whether that becomes an action failure or
/// propagates.
pub fn wait_for<F>(mut predicate: F, options: &WaitOptions) -> PaginaResult<WaitOutcome>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let interval = options.poll_interval();
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        if predicate() {
            let elapsed = start.elapsed();
            tracing::trace!(?elapsed, polls, "wait condition satisfied");
            return Ok(WaitOutcome { elapsed, polls });
        }
        if start.elapsed() + interval > timeout {
            break;
        }
        std::thread::sleep(interval);
    }

    // Run out the remainder of the timeout so the observed duration matches
    // the contract [timeout, timeout + interval)
    let remaining = timeout.saturating_sub(start.elapsed());
    if !remaining.is_zero() {
        std::thread::sleep(remaining);
    }
    let elapsed = start.elapsed();
    tracing::debug!(?elapsed, polls, timeout_ms = options.timeout_ms, "wait timed out");
    Err(PaginaError::Timeout {
        ms: options.timeout_ms,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, 200);
        }

        #[test]
        fn test_chained() {
            let opts = WaitOptions::new().with_timeout(3000).with_poll_interval(50);
            assert_eq!(opts.timeout(), Duration::from_millis(3000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(50));
        }
    }

    mod wait_for_tests {
        use super::*;

        #[test]
        fn test_immediate_success_polls_once() {
            let opts = WaitOptions::new().with_timeout(1000);
            let outcome = wait_for(|| true, &opts).unwrap();
            assert_eq!(outcome.polls, 1);
            assert!(outcome.elapsed < Duration::from_millis(100));
        }

        #[test]
        fn test_success_after_two_polls() {
            let calls = Cell::new(0u32);
            let opts = WaitOptions::new().with_timeout(3000).with_poll_interval(200);
            let start = Instant::now();
            let outcome = wait_for(
                || {
                    calls.set(calls.get() + 1);
                    calls.get() >= 2
                },
                &opts,
            )
            .unwrap();
            assert!(outcome.polls >= 2);
            assert!(start.elapsed() < Duration::from_secs(3));
        }

        #[test]
        fn test_timeout_duration_window() {
            let opts = WaitOptions::new().with_timeout(1000).with_poll_interval(200);
            let start = Instant::now();
            let err = wait_for(|| false, &opts).unwrap_err();
            let elapsed = start.elapsed();
            assert!(elapsed >= Duration::from_millis(1000), "elapsed {elapsed:?}");
            assert!(elapsed < Duration::from_millis(1300), "elapsed {elapsed:?}");
            match err {
                PaginaError::Timeout { ms, elapsed_ms } => {
                    assert_eq!(ms, 1000);
                    assert!(elapsed_ms >= 1000);
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_predicate_not_called_after_success() {
            let calls = Cell::new(0u32);
            let opts = WaitOptions::new().with_timeout(500).with_poll_interval(10);
            let _ = wait_for(
                || {
                    calls.set(calls.get() + 1);
                    true
                },
                &opts,
            )
            .unwrap();
            assert_eq!(calls.get(), 1);
        }
    }
}
