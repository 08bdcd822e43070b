use backon::ConstantBuilder;
use std::time::Duration;

use crate::error::{IsRetryable, RelayError};

/// Bounded constant-delay retry for whole upstream calls.
///
/// `max_attempts` counts the first call, so `1` means no retry at all.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub retryable: fn(&RelayError) -> bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retryable: |e: &RelayError| e.is_retryable(),
        }
    }

    pub fn single() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_predicate(mut self, retryable: fn(&RelayError) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn should_retry(&self, err: &RelayError) -> bool {
        (self.retryable)(err)
    }

    pub fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.base_delay)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}
