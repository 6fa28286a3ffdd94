pub mod config;
pub mod extractor;
pub mod models;
pub mod output;
pub mod paginator;
pub mod runner;
pub mod session;
pub mod stability;
pub mod utils;
pub mod validate;

// Re-export commonly used types
pub use config::AppConfig;
pub use models::{PageSnapshot, Record, RunReport, RunStatus};
pub use utils::error::ScrapeError;

pub type Result<T> = std::result::Result<T, ScrapeError>;
