use std::time::Duration;

use backoff::backoff::Backoff;

/// Waits `step * n` before the n-th retry.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    step: Duration,
    attempt: u32,
}

impl LinearBackoff {
    pub fn new(step: Duration) -> Self {
        Self { step, attempt: 0 }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt = self.attempt.saturating_add(1);
        Some(self.step.saturating_mul(self.attempt))
    }
}

/// Caps another backoff at a fixed number of retries.
#[derive(Debug, Clone)]
pub struct Limited<B> {
    inner: B,
    max_retries: u32,
    retries: u32,
}

impl<B: Backoff> Limited<B> {
    pub fn new(inner: B, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            retries: 0,
        }
    }
}

impl<B: Backoff> Backoff for Limited<B> {
    fn reset(&mut self) {
        self.retries = 0;
        self.inner.reset();
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }
        self.retries += 1;
        self.inner.next_backoff()
    }
}
