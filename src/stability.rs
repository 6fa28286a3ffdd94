use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::config::StabilityConfig;
use crate::session::PageSession;
use crate::Result;

/// Waits out lazy loading on a listing page. Storefronts append cards while
/// the viewport moves, so a single settle delay is never enough; instead the
/// page is scrolled to the bottom and the item count sampled until the same
/// count is observed `stable_threshold` times in a row.
pub struct StabilityDetector {
    config: StabilityConfig,
}

impl StabilityDetector {
    pub fn new(config: StabilityConfig) -> Self {
        Self { config }
    }

    /// Returns the item count once it has held steady. A changed count starts
    /// a fresh streak of one, so termination always reflects a trailing run
    /// of identical samples.
    pub async fn settle(&self, session: &dyn PageSession, item_selector: &str) -> Result<usize> {
        let mut last_count = 0usize;
        let mut streak = 0u32;

        loop {
            self.scroll_to_end(session).await?;
            sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

            let count = session.count_items(item_selector).await?;
            if streak > 0 && count == last_count {
                streak += 1;
            } else {
                last_count = count;
                streak = 1;
            }
            debug!(count, streak, "Sampled item count");

            if streak >= self.config.stable_threshold {
                return Ok(last_count);
            }
        }
    }

    /// Scrolls to the bottom until the document height stops growing, capped
    /// at `max_scroll_steps` for pages that keep inflating.
    async fn scroll_to_end(&self, session: &dyn PageSession) -> Result<()> {
        let mut last_height = session.content_height().await?;

        for _ in 0..self.config.max_scroll_steps {
            session.scroll_to_bottom().await?;
            sleep(Duration::from_millis(self.config.scroll_pause_ms)).await;

            let height = session.content_height().await?;
            if height <= last_height {
                break;
            }
            last_height = height;
        }
        Ok(())
    }
}
