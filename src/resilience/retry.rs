//! # Fixed-Delay Retry
//!
//! A retry loop bounded by attempt count, not by elapsed time. Every failed attempt
//! that is retriable and not the last one is followed by exactly one sleep of the
//! configured delay, so a run of N attempts sleeps N-1 times.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Attempt-bounded retry policy with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay slept between two consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Policy that makes a single attempt and never sleeps
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Attempt budget, never less than one
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Start tracking a retried operation by hand
    pub fn start(&self, operation: impl Into<String>) -> RetryState {
        RetryState {
            policy: *self,
            operation: operation.into(),
            attempt: 1,
        }
    }

    /// Run `f` until it succeeds, fails with a non-retriable error, or the attempt
    /// budget is spent.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        operation: &str,
        is_retriable: P,
        mut f: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: fmt::Display,
    {
        let mut state = self.start(operation);
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retriable = is_retriable(&err);
                    state.record_failure(err, retriable).await?;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Progress of a single retried operation.
///
/// Used directly where the retried body needs mutable access to its surroundings
/// between attempts, which a closure-driven [`RetryPolicy::run`] cannot offer.
#[derive(Debug)]
pub struct RetryState {
    policy: RetryPolicy,
    operation: String,
    attempt: u32,
}

impl RetryState {
    /// Record a failed attempt.
    ///
    /// Returns `Ok(())` after sleeping when another attempt should be made, otherwise
    /// hands the error back wrapped in a [`RetryError`].
    pub async fn record_failure<E: fmt::Display>(
        &mut self,
        err: E,
        retriable: bool,
    ) -> Result<(), RetryError<E>> {
        if !retriable {
            debug!(
                operation = %self.operation,
                attempt = self.attempt,
                error = %err,
                "Non-retriable failure, giving up"
            );
            return Err(RetryError::NonRetriable(err));
        }

        let max_attempts = self.policy.effective_attempts();
        warn!(
            operation = %self.operation,
            attempt = self.attempt,
            max_attempts = max_attempts,
            error = %err,
            "Attempt failed"
        );

        if self.attempt >= max_attempts {
            error!(
                operation = %self.operation,
                max_attempts = max_attempts,
                "Exceeded the maximum number of attempts"
            );
            return Err(RetryError::Exhausted {
                attempts: self.attempt,
                source: err,
            });
        }

        debug!(
            operation = %self.operation,
            delay = ?self.policy.delay,
            "Waiting before retrying"
        );
        tokio::time::sleep(self.policy.delay).await;
        self.attempt += 1;
        Ok(())
    }
}

/// Why a retried operation gave up
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The failure was classified as not worth retrying
    #[error("{0}")]
    NonRetriable(E),

    /// Every allowed attempt failed; `source` is the last failure
    #[error("maximum of {attempts} attempts exceeded")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
