// Integration tests for boardfoot
// These tests drive the page loop and run coordinator against scripted
// sessions, so complete runs can be verified without a browser.

pub mod runner_tests;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use boardfoot::config::{
    AppConfig, BrowserConfig, ExtractionConfig, OutputConfig, PaginationConfig, ScreenshotConfig,
    StabilityConfig,
};
use boardfoot::extractor::ExtractionDescriptor;
use boardfoot::models::RawCard;
use boardfoot::session::{NextControl, PageSession, SessionProvider};
use boardfoot::ScrapeError;

/// Test configuration with all delays zeroed out
pub fn get_test_config() -> AppConfig {
    AppConfig {
        browser: BrowserConfig {
            ws_endpoint: None,
            chrome_path: None,
            user_agent: "Boardfoot-Test/1.0".to_string(),
            connect_attempts: 1,
            connect_retry_delay_ms: 10,
            navigation_timeout_secs: 5,
            store_url: None,
            setup_settle_ms: 0,
        },
        extraction: ExtractionConfig {
            card_selector: ".product-card".to_string(),
            name_selector: ".product-card__title".to_string(),
            dollars_selector: ".price__dollars".to_string(),
            cents_selector: ".price__cents".to_string(),
            max_attempts: 3,
            retry_delay_ms: 0,
        },
        stability: StabilityConfig {
            stable_threshold: 2,
            settle_delay_ms: 0,
            scroll_pause_ms: 0,
            max_scroll_steps: 3,
        },
        pagination: PaginationConfig {
            max_pages: 20,
            next_selector: "a[aria-label='Next']".to_string(),
        },
        screenshots: ScreenshotConfig {
            enabled: false,
            dir: "data/screenshots".to_string(),
        },
        output: OutputConfig {
            dir: "data/exports".to_string(),
        },
    }
}

/// Raw card with a complete name and price, as a healthy page renders it
pub fn card(name: &str, dollars: &str, cents: &str) -> RawCard {
    RawCard {
        name: Some(name.to_string()),
        dollars: Some(dollars.to_string()),
        cents: Some(cents.to_string()),
    }
}

/// Card whose price block never rendered; extracts to the invalid $0.00
pub fn unpriced_card(name: &str) -> RawCard {
    RawCard {
        name: Some(name.to_string()),
        dollars: None,
        cents: None,
    }
}

/// `n` distinct valid cards named `<prefix>-item-<i>`
pub fn numbered_cards(prefix: &str, n: usize) -> Vec<RawCard> {
    (0..n)
        .map(|i| card(&format!("{}-item-{:02}", prefix, i), "1", &format!("{:02}", i % 100)))
        .collect()
}

/// One scripted listing page.
#[derive(Clone)]
pub struct FakePage {
    /// Item-count samples for the stability loop; the last value repeats.
    pub counts: Vec<usize>,
    /// Extraction result per attempt; the last entry repeats.
    pub cards_per_attempt: Vec<Vec<RawCard>>,
    pub next: NextControl,
}

impl FakePage {
    /// Page that extracts cleanly on the first attempt.
    pub fn clean(cards: Vec<RawCard>, next: NextControl) -> Self {
        Self {
            counts: vec![cards.len()],
            cards_per_attempt: vec![cards],
            next,
        }
    }

    /// Page whose prices render blank for `bad_attempts` extractions before
    /// filling in.
    pub fn flaky(bad_attempts: usize, cards: Vec<RawCard>, next: NextControl) -> Self {
        let blank: Vec<RawCard> = cards
            .iter()
            .map(|c| unpriced_card(c.name.as_deref().unwrap_or_default()))
            .collect();
        let mut attempts = vec![blank; bad_attempts];
        attempts.push(cards.clone());
        Self {
            counts: vec![cards.len()],
            cards_per_attempt: attempts,
            next,
        }
    }

    /// Page whose prices never render, no matter how often it is retried.
    pub fn broken(cards: Vec<RawCard>, next: NextControl) -> Self {
        let blank: Vec<RawCard> = cards
            .iter()
            .map(|c| unpriced_card(c.name.as_deref().unwrap_or_default()))
            .collect();
        Self {
            counts: vec![blank.len()],
            cards_per_attempt: vec![blank],
            next,
        }
    }
}

/// Call counts shared between a test and the sessions it hands out.
#[derive(Default)]
pub struct SessionCounters {
    pub navigations: Mutex<Vec<String>>,
    pub clicks: AtomicUsize,
    pub closes: AtomicUsize,
    pub screenshots: AtomicUsize,
    pub extract_calls: AtomicUsize,
    pub next_inspections: AtomicUsize,
}

impl SessionCounters {
    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::Relaxed)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::Relaxed)
    }

    pub fn screenshots(&self) -> usize {
        self.screenshots.load(Ordering::Relaxed)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::Relaxed)
    }

    pub fn next_inspections(&self) -> usize {
        self.next_inspections.load(Ordering::Relaxed)
    }

    pub fn navigated_urls(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct FakeState {
    page: usize,
    attempt: usize,
    count_cursor: usize,
}

/// Scripted `PageSession`: walks the configured pages in order, advancing on
/// every completed click-and-wait.
pub struct FakeSession {
    pages: Vec<FakePage>,
    state: Mutex<FakeState>,
    pub counters: Arc<SessionCounters>,
    fail_navigate: bool,
    fail_wait_after_page: Option<usize>,
}

impl FakeSession {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            state: Mutex::new(FakeState::default()),
            counters: Arc::new(SessionCounters::default()),
            fail_navigate: false,
            fail_wait_after_page: None,
        }
    }

    pub fn with_counters(mut self, counters: Arc<SessionCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Every navigation attempt fails, as with an unreachable store.
    pub fn with_navigate_failure(mut self) -> Self {
        self.fail_navigate = true;
        self
    }

    /// The click away from page `page` (1-based) never completes.
    pub fn with_wait_failure_after(mut self, page: usize) -> Self {
        self.fail_wait_after_page = Some(page);
        self
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> boardfoot::Result<()> {
        if self.fail_navigate {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        self.counters.navigations.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn content_height(&self) -> boardfoot::Result<f64> {
        Ok(100.0)
    }

    async fn scroll_to_bottom(&self) -> boardfoot::Result<()> {
        Ok(())
    }

    async fn count_items(&self, _selector: &str) -> boardfoot::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let counts = &self.pages[state.page].counts;
        let count = counts[state.count_cursor.min(counts.len() - 1)];
        state.count_cursor += 1;
        Ok(count)
    }

    async fn extract_cards(
        &self,
        _descriptor: &ExtractionDescriptor,
    ) -> boardfoot::Result<Vec<RawCard>> {
        self.counters.extract_calls.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock().unwrap();
        let attempts = &self.pages[state.page].cards_per_attempt;
        let cards = attempts[state.attempt.min(attempts.len() - 1)].clone();
        state.attempt += 1;
        Ok(cards)
    }

    async fn next_control(&self, _selector: &str) -> boardfoot::Result<NextControl> {
        self.counters.next_inspections.fetch_add(1, Ordering::Relaxed);
        let state = self.state.lock().unwrap();
        Ok(self.pages[state.page].next)
    }

    async fn click(&self, _selector: &str) -> boardfoot::Result<()> {
        self.counters.clicks.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn wait_for_navigation(&self) -> boardfoot::Result<()> {
        let mut state = self.state.lock().unwrap();
        if self.fail_wait_after_page == Some(state.page + 1) {
            return Err(ScrapeError::NavigationTimeout { seconds: 5 });
        }
        assert!(
            state.page + 1 < self.pages.len(),
            "scripted session ran out of pages"
        );
        state.page += 1;
        state.attempt = 0;
        state.count_cursor = 0;
        Ok(())
    }

    async fn screenshot(&self, label: &str) -> boardfoot::Result<PathBuf> {
        self.counters.screenshots.fetch_add(1, Ordering::Relaxed);
        Ok(PathBuf::from(format!("/tmp/{}.png", label)))
    }

    async fn close(&self) -> boardfoot::Result<()> {
        self.counters.closes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Session provider handing out scripted sessions that share one set of
/// counters with the test.
pub struct FakeProvider {
    pages: Vec<FakePage>,
    fail_acquire: bool,
    fail_wait_after_page: Option<usize>,
    pub counters: Arc<SessionCounters>,
    pub acquire_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            fail_acquire: false,
            fail_wait_after_page: None,
            counters: Arc::new(SessionCounters::default()),
            acquire_calls: AtomicUsize::new(0),
        }
    }

    /// Provider whose acquisition always fails, as when no browser is
    /// reachable.
    pub fn failing() -> Self {
        Self {
            fail_acquire: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_wait_failure_after(mut self, page: usize) -> Self {
        self.fail_wait_after_page = Some(page);
        self
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    async fn acquire(&self) -> boardfoot::Result<Box<dyn PageSession>> {
        self.acquire_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_acquire {
            return Err(ScrapeError::Setup("No browser available".to_string()));
        }

        let mut session =
            FakeSession::new(self.pages.clone()).with_counters(Arc::clone(&self.counters));
        if let Some(page) = self.fail_wait_after_page {
            session = session.with_wait_failure_after(page);
        }
        Ok(Box::new(session))
    }
}
