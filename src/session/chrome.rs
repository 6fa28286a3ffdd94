use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, info};

use crate::config::{BrowserConfig, ScreenshotConfig};
use crate::extractor::ExtractionDescriptor;
use crate::models::RawCard;
use crate::session::{NextControl, PageSession, SessionProvider};
use crate::utils::error::ScrapeError;
use crate::Result;

/// Connects to a remote browser over DevTools websocket when an endpoint is
/// configured, otherwise launches a local headless Chrome.
pub struct ChromeProvider {
    config: BrowserConfig,
    screenshots: ScreenshotConfig,
}

impl ChromeProvider {
    pub fn new(config: BrowserConfig, screenshots: ScreenshotConfig) -> Self {
        Self {
            config,
            screenshots,
        }
    }

    fn connect(&self) -> Result<Browser> {
        if let Some(ref ws) = self.config.ws_endpoint {
            return Browser::connect(ws.clone()).map_err(|e| {
                ScrapeError::Setup(format!("Failed to connect to browser at {}: {}", ws, e))
            });
        }

        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
                std::ffi::OsStr::new("--disable-background-timer-throttling"),
                std::ffi::OsStr::new("--disable-backgrounding-occluded-windows"),
                std::ffi::OsStr::new("--disable-renderer-backgrounding"),
            ])
            .build()
            .map_err(|e| ScrapeError::Setup(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &self.config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        Browser::new(launch_options)
            .map_err(|e| ScrapeError::Setup(format!("Failed to launch browser: {}", e)))
    }
}

#[async_trait]
impl SessionProvider for ChromeProvider {
    async fn acquire(&self) -> Result<Box<dyn PageSession>> {
        let strategy = FixedInterval::from_millis(self.config.connect_retry_delay_ms)
            .take(self.config.connect_attempts.saturating_sub(1) as usize);
        let browser = Retry::start(strategy, || async { self.connect() }).await?;

        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Setup(format!("Failed to create tab: {}", e)))?;

        tab.set_user_agent(&self.config.user_agent, None, None)
            .map_err(|e| ScrapeError::Setup(format!("Failed to set user agent: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(self.config.navigation_timeout_secs));

        info!("Browser session ready");

        Ok(Box::new(ChromeSession {
            browser,
            tab,
            screenshots: self.screenshots.clone(),
            nav_timeout_secs: self.config.navigation_timeout_secs,
        }))
    }
}

pub struct ChromeSession {
    // Dropping the browser ends the Chrome process, so it lives as long
    // as the tab does.
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<headless_chrome::Tab>,
    screenshots: ScreenshotConfig,
    nav_timeout_secs: u64,
}

impl ChromeSession {
    fn evaluate(&self, expression: &str) -> Result<Option<serde_json::Value>> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| ScrapeError::Evaluate(format!("{}: {}", expression, e)))?;
        Ok(result.value)
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url).map_err(|e| ScrapeError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn content_height(&self) -> Result<f64> {
        self.evaluate("document.body.scrollHeight")?
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ScrapeError::Evaluate("scrollHeight returned no number".to_string()))
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.evaluate("window.scrollTo(0, document.body.scrollHeight)")?;
        Ok(())
    }

    async fn count_items(&self, selector: &str) -> Result<usize> {
        let expression = format!(
            "document.querySelectorAll({}).length",
            serde_json::to_string(selector)?
        );
        let count = self
            .evaluate(&expression)?
            .and_then(|v| v.as_u64())
            .ok_or_else(|| {
                ScrapeError::Evaluate(format!("element count for '{}' returned no number", selector))
            })?;
        Ok(count as usize)
    }

    async fn extract_cards(&self, descriptor: &ExtractionDescriptor) -> Result<Vec<RawCard>> {
        let html = self
            .tab
            .get_content()
            .map_err(|e| ScrapeError::Evaluate(format!("Failed to get page content: {}", e)))?;
        parse_cards(&html, descriptor)
    }

    async fn next_control(&self, selector: &str) -> Result<NextControl> {
        let html = self
            .tab
            .get_content()
            .map_err(|e| ScrapeError::Evaluate(format!("Failed to get page content: {}", e)))?;
        classify_next(&html, selector)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| ScrapeError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .map_err(|e| ScrapeError::Evaluate(format!("Click on '{}' failed: {}", selector, e)))?;
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<()> {
        self.tab.wait_until_navigated().map_err(|e| {
            debug!("Navigation wait failed: {}", e);
            ScrapeError::NavigationTimeout {
                seconds: self.nav_timeout_secs,
            }
        })?;
        Ok(())
    }

    async fn screenshot(&self, label: &str) -> Result<PathBuf> {
        let data = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| ScrapeError::Evaluate(format!("Screenshot capture failed: {}", e)))?;

        // Generate unique filename
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}_{}.png", label, timestamp, uuid::Uuid::new_v4().simple());
        let path = Path::new(&self.screenshots.dir).join(&filename);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, data)?;

        Ok(path)
    }

    async fn close(&self) -> Result<()> {
        // Close tab to free resources; the browser follows when the
        // session drops
        let _ = self.tab.close(true);
        Ok(())
    }
}

fn parse_selector(value: &str) -> Result<Selector> {
    Selector::parse(value).map_err(|e| ScrapeError::Selector {
        selector: value.to_string(),
        message: format!("{:?}", e),
    })
}

/// Pulls the raw name and price fields out of every card in the document,
/// preserving document order. Runs on a fetched HTML string so the page
/// only has to cross the DevTools boundary once per attempt.
fn parse_cards(html: &str, descriptor: &ExtractionDescriptor) -> Result<Vec<RawCard>> {
    let document = Html::parse_document(html);
    let card = parse_selector(&descriptor.card)?;
    let name = parse_selector(&descriptor.name)?;
    let dollars = parse_selector(&descriptor.dollars)?;
    let cents = parse_selector(&descriptor.cents)?;

    let mut cards = Vec::new();
    for element in document.select(&card) {
        cards.push(RawCard {
            name: first_text(&element, &name),
            dollars: first_text(&element, &dollars),
            cents: first_text(&element, &cents),
        });
    }
    Ok(cards)
}

fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|node| {
            node.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}

fn classify_next(html: &str, selector: &str) -> Result<NextControl> {
    let document = Html::parse_document(html);
    let control = parse_selector(selector)?;

    let Some(element) = document.select(&control).next() else {
        return Ok(NextControl::Absent);
    };

    let disabled = element.value().attr("disabled").is_some()
        || element
            .value()
            .attr("aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    if disabled {
        Ok(NextControl::Disabled)
    } else {
        Ok(NextControl::Ready)
    }
}
