use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn, Instrument};

use crate::config::AppConfig;
use crate::models::RunReport;
use crate::paginator::{Harvest, Paginator};
use crate::session::{PageSession, SessionProvider};
use crate::utils::error::ScrapeError;
use crate::Result;

/// One unit of work handed in by the caller, typically from the CLI.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub run_id: String,
    pub target_url: String,
}

/// Owns the lifecycle of a single run: session acquisition, optional store
/// context setup, the page loop, and session release.
pub struct RunCoordinator {
    config: AppConfig,
}

impl RunCoordinator {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Always produces a report. Failures inside the run are logged and
    /// folded into a failed status rather than propagated, so the caller can
    /// emit the report unconditionally.
    pub async fn execute(&self, provider: &dyn SessionProvider, request: &RunRequest) -> RunReport {
        let span = tracing::info_span!("run", id = %request.run_id);
        self.execute_inner(provider, request).instrument(span).await
    }

    async fn execute_inner(
        &self,
        provider: &dyn SessionProvider,
        request: &RunRequest,
    ) -> RunReport {
        let started_at = Utc::now();
        info!(url = %request.target_url, "Starting run");

        let session = match provider.acquire().await {
            Ok(session) => session,
            Err(e) => {
                error!("Session acquisition failed: {}", e);
                return RunReport::failed(&request.run_id, &request.target_url, &e, started_at);
            }
        };

        let outcome = self.drive(session.as_ref(), request).await;

        // One close per acquired session, on success and failure alike
        if let Err(e) = session.close().await {
            warn!("Session close failed: {}", e);
        }

        match outcome {
            Ok(harvest) => {
                info!(
                    records = harvest.records.len(),
                    pages = harvest.pages_visited,
                    degraded = harvest.pages_degraded,
                    "Run completed"
                );
                RunReport::completed(
                    &request.run_id,
                    &request.target_url,
                    harvest.records,
                    harvest.pages_visited,
                    harvest.pages_degraded,
                    started_at,
                )
            }
            Err(e) => {
                error!(kind = e.kind(), "Run failed: {}", e);
                RunReport::failed(&request.run_id, &request.target_url, &e, started_at)
            }
        }
    }

    async fn drive(&self, session: &dyn PageSession, request: &RunRequest) -> Result<Harvest> {
        // Visiting the store page once makes the regional pricing cookie
        // apply to every listing page the session opens afterwards.
        if let Some(ref store_url) = self.config.browser.store_url {
            info!(url = %store_url, "Establishing store context");
            session.navigate(store_url).await.map_err(|e| {
                ScrapeError::Setup(format!("Store context navigation failed: {}", e))
            })?;
            sleep(Duration::from_millis(self.config.browser.setup_settle_ms)).await;
        }

        Paginator::new(&self.config)
            .collect(session, &request.target_url)
            .await
    }
}
