//! Bounded exponential backoff for transient provider failures.

use std::thread::sleep;
use std::time::Duration;

use crate::error::{Error, Result};

/// Retry settings for embedding requests.
///
/// Attempt `n` (1-based) waits `base_delay * 2^(n-1)`, capped at `max_delay`.
/// Only errors for which [`Error::is_transient`] holds are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy {
    /// Three retries starting at 2s, capped at 30s.
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new().with_max_retries(0)
    }

    /// Set the number of retries after the first attempt.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the backoff ceiling.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Number of retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Run `op`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Permanent errors are returned as-is on first sight. A transient error
    /// that outlives the retry budget is wrapped in
    /// [`Error::RetriesExhausted`].
    pub fn run<T, F>(&self, provider: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut retries = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    if retries >= self.max_retries {
                        return Err(Error::RetriesExhausted {
                            attempts: retries + 1,
                            last: Box::new(err),
                        });
                    }
                    retries += 1;
                    let delay = self.delay_for_attempt(retries);
                    log::warn!(
                        "{} embedding request failed ({}), retry {}/{} in {:?}",
                        provider,
                        err,
                        retries,
                        self.max_retries,
                        delay
                    );
                    sleep(delay);
                },
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn instant() -> RetryPolicy {
        RetryPolicy::new().with_base_delay(Duration::ZERO)
    }

    fn unavailable() -> Error {
        Error::EmbeddingStatus {
            provider: "test",
            status: 503,
            body: String::new(),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(30));
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let calls = Cell::new(0);
        let result = instant().run("test", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(unavailable())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhausted_retries_report_last_error() {
        let calls = Cell::new(0);
        let result: Result<()> = instant().with_max_retries(2).run("test", || {
            calls.set(calls.get() + 1);
            Err(unavailable())
        });
        assert_eq!(calls.get(), 3);
        match result {
            Err(Error::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, Error::EmbeddingStatus { status: 503, .. }));
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_permanent_error_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = instant().run("test", || {
            calls.set(calls.get() + 1);
            Err(Error::EmbeddingStatus {
                provider: "test",
                status: 401,
                body: "bad key".to_string(),
            })
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(Error::EmbeddingStatus { status: 401, .. })));
    }

    #[test]
    fn test_no_retry_policy() {
        let calls = Cell::new(0);
        let result: Result<()> = RetryPolicy::none().run("test", || {
            calls.set(calls.get() + 1);
            Err(unavailable())
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(Error::RetriesExhausted { attempts: 1, .. })));
    }
}
