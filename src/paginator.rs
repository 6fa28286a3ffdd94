use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, PaginationConfig};
use crate::extractor::{ExtractionDescriptor, RecordExtractor};
use crate::models::{PageSnapshot, Record};
use crate::session::{NextControl, PageSession};
use crate::stability::StabilityDetector;
use crate::utils::error::ScrapeError;
use crate::validate::{Assessment, RetryGovernor};
use crate::Result;

/// Phase of the page loop. `collect` advances one phase per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Navigating,
    Stabilizing,
    Extracting,
    Validating,
    Deciding,
    NextPage,
    Terminal,
}

/// Why the page loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Hard page cap reached; wins even over an enabled next control.
    PageCap,
    /// No pagination control in the document.
    NoNextControl,
    /// Pagination control present but disabled, i.e. the last page.
    NextControlDisabled,
}

/// Accumulated output of the page loop.
#[derive(Debug, Default)]
pub struct Harvest {
    pub records: Vec<Record>,
    pub pages_visited: u32,
    pub pages_degraded: u32,
    pub stopped: Option<StopReason>,
}

/// Walks a paginated listing from its first page: settle, extract, validate,
/// then either follow the next control or stop. Committed pages append their
/// records in page order, so the harvest preserves the catalog's ordering.
pub struct Paginator {
    config: PaginationConfig,
    detector: StabilityDetector,
    extractor: RecordExtractor,
    descriptor: ExtractionDescriptor,
    governor: RetryGovernor,
    capture_degraded: bool,
}

impl Paginator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.pagination.clone(),
            detector: StabilityDetector::new(config.stability.clone()),
            extractor: RecordExtractor::new(),
            descriptor: ExtractionDescriptor::from(&config.extraction),
            governor: RetryGovernor::new(&config.extraction),
            capture_degraded: config.screenshots.enabled,
        }
    }

    pub async fn collect(&self, session: &dyn PageSession, start_url: &str) -> Result<Harvest> {
        let mut harvest = Harvest::default();
        let mut snapshot = PageSnapshot::default();
        let mut attempt: u32 = 1;
        let mut state = PagerState::Navigating;

        loop {
            state = match state {
                PagerState::Navigating => {
                    session.navigate(start_url).await.map_err(|e| {
                        ScrapeError::Setup(format!(
                            "Initial navigation to {} failed: {}",
                            start_url, e
                        ))
                    })?;
                    PagerState::Stabilizing
                }

                PagerState::Stabilizing => {
                    let count = self.detector.settle(session, &self.descriptor.card).await?;
                    debug!(count, "Item count settled");
                    PagerState::Extracting
                }

                PagerState::Extracting => {
                    let cards = session.extract_cards(&self.descriptor).await?;
                    snapshot = self.extractor.snapshot_from(&cards);
                    PagerState::Validating
                }

                PagerState::Validating => match self.governor.assess(&snapshot, attempt) {
                    Assessment::Accept => {
                        self.commit(&mut harvest, std::mem::take(&mut snapshot));
                        attempt = 1;
                        PagerState::Deciding
                    }
                    Assessment::Retry { after } => {
                        warn!(
                            attempt,
                            invalid = snapshot.invalid_count(),
                            "Invalid records, retrying extraction"
                        );
                        sleep(after).await;
                        attempt += 1;
                        PagerState::Stabilizing
                    }
                    Assessment::AcceptDegraded { invalid } => {
                        warn!(
                            invalid,
                            page = harvest.pages_visited + 1,
                            "Extraction retries exhausted, keeping degraded page"
                        );
                        if self.capture_degraded {
                            let label = format!("degraded-page-{}", harvest.pages_visited + 1);
                            match session.screenshot(&label).await {
                                Ok(path) => info!("Saved diagnostic screenshot to {:?}", path),
                                Err(e) => warn!("Screenshot failed: {}", e),
                            }
                        }
                        let mut degraded = std::mem::take(&mut snapshot);
                        degraded.degraded = true;
                        self.commit(&mut harvest, degraded);
                        attempt = 1;
                        PagerState::Deciding
                    }
                },

                PagerState::Deciding => {
                    if harvest.pages_visited >= self.config.max_pages {
                        info!(pages = harvest.pages_visited, "Page cap reached");
                        harvest.stopped = Some(StopReason::PageCap);
                        PagerState::Terminal
                    } else {
                        match session.next_control(&self.config.next_selector).await? {
                            NextControl::Absent => {
                                harvest.stopped = Some(StopReason::NoNextControl);
                                PagerState::Terminal
                            }
                            NextControl::Disabled => {
                                harvest.stopped = Some(StopReason::NextControlDisabled);
                                PagerState::Terminal
                            }
                            NextControl::Ready => PagerState::NextPage,
                        }
                    }
                }

                PagerState::NextPage => {
                    session.click(&self.config.next_selector).await?;
                    session.wait_for_navigation().await?;
                    PagerState::Stabilizing
                }

                PagerState::Terminal => {
                    info!(
                        pages = harvest.pages_visited,
                        records = harvest.records.len(),
                        reason = ?harvest.stopped,
                        "Page loop finished"
                    );
                    return Ok(harvest);
                }
            };
        }
    }

    fn commit(&self, harvest: &mut Harvest, snapshot: PageSnapshot) {
        harvest.pages_visited += 1;
        if snapshot.degraded {
            harvest.pages_degraded += 1;
        }
        info!(
            page = harvest.pages_visited,
            records = snapshot.records.len(),
            degraded = snapshot.degraded,
            "Committed page"
        );
        harvest.records.extend(snapshot.records);
    }
}
