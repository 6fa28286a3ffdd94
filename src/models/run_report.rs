use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::utils::error::ScrapeError;

/// Terminal outcome of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed { kind: String, message: String },
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// Everything a run produced, reported as one JSON document on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub target_url: String,
    pub records: Vec<Record>,
    pub pages_visited: u32,
    pub pages_degraded: u32,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn completed(
        run_id: &str,
        target_url: &str,
        records: Vec<Record>,
        pages_visited: u32,
        pages_degraded: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            target_url: target_url.to_string(),
            records,
            pages_visited,
            pages_degraded,
            status: RunStatus::Completed,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// A failed run carries no records, even when earlier pages had
    /// extracted cleanly.
    pub fn failed(
        run_id: &str,
        target_url: &str,
        error: &ScrapeError,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            target_url: target_url.to_string(),
            records: Vec::new(),
            pages_visited: 0,
            pages_degraded: 0,
            status: RunStatus::Failed {
                kind: error.kind().to_string(),
                message: error.to_string(),
            },
            started_at,
            finished_at: Utc::now(),
        }
    }
}
