pub mod chrome;

pub use chrome::{ChromeProvider, ChromeSession};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extractor::ExtractionDescriptor;
use crate::models::RawCard;
use crate::Result;

/// Observed state of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextControl {
    /// Present and clickable.
    Ready,
    /// Present but marked disabled.
    Disabled,
    /// Not in the document at all.
    Absent,
}

/// Everything the extraction loop needs from a rendered page. The production
/// backend drives a Chrome tab; tests substitute scripted fakes.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current document scroll height, used to detect lazy-load growth.
    async fn content_height(&self) -> Result<f64>;

    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Number of elements currently matching `selector`.
    async fn count_items(&self, selector: &str) -> Result<usize>;

    /// Reads the raw name and price fields of every card on the page,
    /// in document order.
    async fn extract_cards(&self, descriptor: &ExtractionDescriptor) -> Result<Vec<RawCard>>;

    async fn next_control(&self, selector: &str) -> Result<NextControl>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Blocks until the navigation triggered by a click settles.
    async fn wait_for_navigation(&self) -> Result<()>;

    /// Captures a diagnostic screenshot and returns its path. Callers treat
    /// failures as non-fatal.
    async fn screenshot(&self, label: &str) -> Result<PathBuf>;

    async fn close(&self) -> Result<()>;
}

/// Hands out fresh page sessions. Acquisition is the only place browser
/// connection details live.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn PageSession>>;
}
