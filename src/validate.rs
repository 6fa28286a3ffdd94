use std::time::Duration;

use crate::config::ExtractionConfig;
use crate::models::PageSnapshot;

/// What to do with a freshly extracted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Every record checks out; commit the snapshot.
    Accept,
    /// Invalid records present and attempts remain; re-extract after a pause.
    Retry { after: Duration },
    /// Attempts exhausted; keep the snapshot but mark the page degraded.
    AcceptDegraded { invalid: usize },
}

/// Bounded retry policy for pages whose records fail validation. Lazy price
/// blocks usually fill in within a retry or two; pages that never produce a
/// clean snapshot are kept anyway so one stubborn page cannot stall a run.
pub struct RetryGovernor {
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryGovernor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// `attempt` is 1-based: the first extraction of a page is attempt 1.
    pub fn assess(&self, snapshot: &PageSnapshot, attempt: u32) -> Assessment {
        let invalid = snapshot.invalid_count();
        if invalid == 0 {
            Assessment::Accept
        } else if attempt < self.max_attempts {
            Assessment::Retry {
                after: self.retry_delay,
            }
        } else {
            Assessment::AcceptDegraded { invalid }
        }
    }
}
