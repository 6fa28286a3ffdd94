use config::{Config, ConfigError, Environment, File};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub browser: BrowserConfig,
    pub extraction: ExtractionConfig,
    pub stability: StabilityConfig,
    pub pagination: PaginationConfig,
    pub screenshots: ScreenshotConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub ws_endpoint: Option<String>,
    pub chrome_path: Option<String>,
    pub user_agent: String,
    pub connect_attempts: u32,
    pub connect_retry_delay_ms: u64,
    pub navigation_timeout_secs: u64,
    pub store_url: Option<String>,
    pub setup_settle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub card_selector: String,
    pub name_selector: String,
    pub dollars_selector: String,
    pub cents_selector: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    pub stable_threshold: u32,
    pub settle_delay_ms: u64,
    pub scroll_pause_ms: u64,
    pub max_scroll_steps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub max_pages: u32,
    pub next_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    pub enabled: bool,
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "BOARDFOOT_"
            .add_source(Environment::with_prefix("BOARDFOOT").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Browser endpoint and binary path from environment if not set
        if config.browser.ws_endpoint.is_none() {
            config.browser.ws_endpoint = env::var("BROWSER_WS_ENDPOINT").ok();
        }
        if config.browser.chrome_path.is_none() {
            config.browser.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate browser configuration
        if let Some(ref ws) = self.browser.ws_endpoint {
            if !ws.starts_with("ws://") && !ws.starts_with("wss://") {
                return Err(ConfigError::Message(
                    "Browser ws_endpoint must use the ws:// or wss:// scheme".into(),
                ));
            }
        }

        if let Some(ref store_url) = self.browser.store_url {
            if Url::parse(store_url).is_err() {
                return Err(ConfigError::Message("Invalid store URL format".into()));
            }
        }

        if self.browser.connect_attempts == 0 {
            return Err(ConfigError::Message(
                "Browser connect_attempts must be greater than 0".into(),
            ));
        }

        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Browser navigation_timeout_secs must be greater than 0".into(),
            ));
        }

        // Malformed selectors fail the run here, before a browser is launched
        check_selector(&self.extraction.card_selector, "extraction.card_selector")?;
        check_selector(&self.extraction.name_selector, "extraction.name_selector")?;
        check_selector(&self.extraction.dollars_selector, "extraction.dollars_selector")?;
        check_selector(&self.extraction.cents_selector, "extraction.cents_selector")?;
        check_selector(&self.pagination.next_selector, "pagination.next_selector")?;

        // Validate extraction configuration
        if self.extraction.max_attempts == 0 {
            return Err(ConfigError::Message(
                "Extraction max_attempts must be greater than 0".into(),
            ));
        }

        // Validate stability configuration
        if self.stability.stable_threshold == 0 {
            return Err(ConfigError::Message(
                "Stability stable_threshold must be greater than 0".into(),
            ));
        }

        if self.stability.max_scroll_steps == 0 {
            return Err(ConfigError::Message(
                "Stability max_scroll_steps must be greater than 0".into(),
            ));
        }

        // Validate pagination configuration
        if self.pagination.max_pages == 0 {
            return Err(ConfigError::Message(
                "Pagination max_pages must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

fn check_selector(value: &str, field: &str) -> Result<(), ConfigError> {
    Selector::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Message(format!("Invalid CSS selector in {}: {:?}", field, e)))
}
