use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Browser session unavailable: {0}")]
    Setup(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation did not complete within {seconds}s")]
    NavigationTimeout { seconds: u64 },

    #[error("Page evaluation failed: {0}")]
    Evaluate(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Short machine-readable tag, used in run reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Setup(_) => "setup",
            ScrapeError::Navigation { .. } => "navigation",
            ScrapeError::NavigationTimeout { .. } => "navigation_timeout",
            ScrapeError::Evaluate(_) => "evaluate",
            ScrapeError::ElementNotFound { .. } => "element_not_found",
            ScrapeError::Selector { .. } => "selector",
            ScrapeError::Config(_) => "config",
            ScrapeError::Io(_) => "io",
            ScrapeError::Serialization(_) => "serialization",
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ScrapeError>;
