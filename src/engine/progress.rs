/// snapshot handed to the progress callback. human-facing only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub iteration: u64,
    pub accepted: u64,
}

/// fires every `interval` iterations, starting with iteration 0
pub(super) struct ProgressThrottle {
    interval: u64,
}

impl ProgressThrottle {
    pub(super) fn new(interval: u64) -> Self {
        Self { interval: interval.max(1) }
    }

    #[inline]
    pub(super) fn should_report(&self, iteration: u64) -> bool {
        iteration % self.interval == 0
    }
}
