pub mod record;
pub mod run_report;

// Re-exports for convenience
pub use record::*;
pub use run_report::*;
