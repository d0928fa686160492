//! Single-job exclusivity.

use std::sync::atomic::{AtomicBool, Ordering};

use super::JobError;

/// Allows at most one conversion at a time.
///
/// Owned by whoever starts jobs and passed by reference into
/// [`ConversionJob::run`](super::ConversionJob::run).
#[derive(Debug, Default)]
pub struct JobGuard {
    running: AtomicBool,
}

impl JobGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or fail with [`JobError::Busy`] if a job holds it.
    pub fn try_acquire(&self) -> Result<JobPermit<'_>, JobError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| JobPermit { guard: self })
            .map_err(|_| JobError::Busy)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the duration of a job; releases the guard on drop.
#[derive(Debug)]
pub struct JobPermit<'a> {
    guard: &'a JobGuard,
}

impl Drop for JobPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}
