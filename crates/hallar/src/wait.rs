//! Polling wait for eventually-consistent queries.
//!
//! Bridges a synchronous snapshot query into an asynchronous, retry-tolerant
//! result: run the query, and if it comes back empty, keep retrying at a
//! fixed interval until something matches or the timeout elapses. Suspension
//! happens on the runtime timer only — the host thread is never blocked.
//!
//! Timing is explicit configuration handed to every call, defaulted but
//! overridable; there is no process-wide mutable state.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

/// Default timeout for polling resolution (5 seconds).
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Timing configuration for polling resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds.
    pub timeout_ms: u64,
    /// Polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval in milliseconds.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Polling interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Run `query` until it yields a non-empty result or the timeout elapses.
///
/// The first attempt runs immediately and a non-empty result is returned
/// without delay. After an empty attempt, once the elapsed time since the
/// first attempt has reached the timeout, the empty result is returned as a
/// normal terminal outcome — "nothing matched" is not an error. The query is
/// awaited on every attempt, so it may itself suspend.
pub async fn poll_until_found<T, Q, Fut>(mut query: Q, options: &WaitOptions) -> Vec<T>
where
    Q: FnMut() -> Fut,
    Fut: Future<Output = Vec<T>>,
{
    let start = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let found = query().await;
        if !found.is_empty() {
            debug!(attempts, matched = found.len(), "query matched");
            return found;
        }
        if start.elapsed() >= options.timeout() {
            debug!(attempts, timeout_ms = options.timeout_ms, "query timed out empty");
            return found;
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(options.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_builder_chain() {
            let options = WaitOptions::new().with_timeout(750).with_poll_interval(25);
            assert_eq!(options.timeout(), Duration::from_millis(750));
            assert_eq!(options.poll_interval(), Duration::from_millis(25));
        }
    }

    mod polling_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_immediate_result_returns_without_delay() {
            let before = Instant::now();
            let found = poll_until_found(|| async { vec![1, 2, 3] }, &WaitOptions::default()).await;
            assert_eq!(found, vec![1, 2, 3]);
            assert_eq!(before.elapsed(), Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_result_on_nth_attempt() {
            let calls = Arc::new(AtomicUsize::new(0));
            let probe = calls.clone();
            let options = WaitOptions::new().with_timeout(5_000).with_poll_interval(100);
            let found = poll_until_found(
                move || {
                    let probe = probe.clone();
                    async move {
                        if probe.fetch_add(1, Ordering::SeqCst) + 1 >= 4 {
                            vec!["found"]
                        } else {
                            Vec::new()
                        }
                    }
                },
                &options,
            )
            .await;
            assert_eq!(found, vec!["found"]);
            assert_eq!(calls.load(Ordering::SeqCst), 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_empty_exactly_at_timeout() {
            let before = Instant::now();
            let options = WaitOptions::new().with_timeout(1_000).with_poll_interval(100);
            let found: Vec<u8> = poll_until_found(|| async { Vec::new() }, &options).await;
            assert!(found.is_empty());
            assert_eq!(before.elapsed(), Duration::from_millis(1_000));
        }

        #[tokio::test(start_paused = true)]
        async fn test_zero_timeout_still_attempts_once() {
            let calls = Arc::new(AtomicUsize::new(0));
            let probe = calls.clone();
            let options = WaitOptions::new().with_timeout(0);
            let found: Vec<u8> = poll_until_found(
                move || {
                    let probe = probe.clone();
                    async move {
                        probe.fetch_add(1, Ordering::SeqCst);
                        Vec::new()
                    }
                },
                &options,
            )
            .await;
            assert!(found.is_empty());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_async_query_is_awaited_each_attempt() {
            let options = WaitOptions::new().with_timeout(500).with_poll_interval(100);
            let found: Vec<u8> = poll_until_found(
                || async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Vec::new()
                },
                &options,
            )
            .await;
            assert!(found.is_empty());
        }
    }
}
