use std::time::Duration;

/// What the runner does when a synthesis call fails.
///
/// `MonthlyEditLimitReached` stops the run under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Log the failure and move on to the next task
    SkipOnError,
    /// On a full library, evict one entry per remaining task and retry each once
    EvictAndRetryOnce,
    /// Retry the same task until it succeeds, waiting `delay` between attempts
    RetryWithDelay { delay: Duration },
}

impl RetryPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            RetryPolicy::SkipOnError => "skip",
            RetryPolicy::EvictAndRetryOnce => "evict",
            RetryPolicy::RetryWithDelay { .. } => "delay",
        }
    }
}

impl std::fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryPolicy::RetryWithDelay { delay } => {
                write!(f, "{} ({}s)", self.name(), delay.as_secs_f32())
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}
