use super::*;
use boardfoot::runner::{RunCoordinator, RunRequest};
use boardfoot::RunStatus;

fn request() -> RunRequest {
    RunRequest {
        run_id: "run-42".to_string(),
        target_url: "https://www.example.com/pl/lumber/4294934245".to_string(),
    }
}

#[tokio::test]
async fn test_completed_run_closes_session_once() -> anyhow::Result<()> {
    let provider = FakeProvider::new(vec![
        FakePage::clean(numbered_cards("page1", 3), NextControl::Ready),
        FakePage::clean(numbered_cards("page2", 2), NextControl::Absent),
    ]);
    let coordinator = RunCoordinator::new(get_test_config());

    let report = coordinator.execute(&provider, &request()).await;

    assert!(report.status.is_completed());
    assert_eq!(report.run_id, "run-42");
    assert_eq!(report.records.len(), 5);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pages_degraded, 0);
    assert!(report.finished_at >= report.started_at);
    assert_eq!(provider.counters.closes(), 1);

    Ok(())
}

#[tokio::test]
async fn test_acquisition_failure_reports_without_session() -> anyhow::Result<()> {
    let provider = FakeProvider::failing();
    let coordinator = RunCoordinator::new(get_test_config());

    let report = coordinator.execute(&provider, &request()).await;

    match report.status {
        RunStatus::Failed { ref kind, ref message } => {
            assert_eq!(kind, "setup");
            assert!(message.contains("No browser available"));
        }
        _ => panic!("expected a failed report, got {:?}", report.status),
    }
    assert!(report.records.is_empty());
    assert_eq!(report.pages_visited, 0);
    assert_eq!(provider.acquire_calls.load(Ordering::Relaxed), 1);

    // No session was ever handed out, so there is nothing to close
    assert_eq!(provider.counters.closes(), 0);

    Ok(())
}

#[tokio::test]
async fn test_mid_run_timeout_discards_partial_records() -> anyhow::Result<()> {
    // Page 1 commits fine, then the click towards page 2 never completes
    let provider = FakeProvider::new(vec![
        FakePage::clean(numbered_cards("page1", 6), NextControl::Ready),
        FakePage::clean(numbered_cards("page2", 6), NextControl::Absent),
    ])
    .with_wait_failure_after(1);
    let coordinator = RunCoordinator::new(get_test_config());

    let report = coordinator.execute(&provider, &request()).await;

    match report.status {
        RunStatus::Failed { ref kind, .. } => assert_eq!(kind, "navigation_timeout"),
        _ => panic!("expected a failed report, got {:?}", report.status),
    }

    // A failed run contributes no records, even from pages already visited
    assert!(report.records.is_empty());
    assert_eq!(report.pages_visited, 0);

    // The session still gets released
    assert_eq!(provider.counters.closes(), 1);

    Ok(())
}

#[tokio::test]
async fn test_store_context_precedes_target_listing() -> anyhow::Result<()> {
    let mut config = get_test_config();
    config.browser.store_url = Some("https://www.example.com/store/on/ottawa".to_string());

    let provider = FakeProvider::new(vec![FakePage::clean(
        numbered_cards("page1", 2),
        NextControl::Absent,
    )]);
    let coordinator = RunCoordinator::new(config);

    let report = coordinator.execute(&provider, &request()).await;

    assert!(report.status.is_completed());
    assert_eq!(
        provider.counters.navigated_urls(),
        vec![
            "https://www.example.com/store/on/ottawa".to_string(),
            "https://www.example.com/pl/lumber/4294934245".to_string(),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_report_round_trips_through_json() -> anyhow::Result<()> {
    let provider = FakeProvider::new(vec![FakePage::clean(
        numbered_cards("page1", 2),
        NextControl::Absent,
    )]);
    let coordinator = RunCoordinator::new(get_test_config());

    let report = coordinator.execute(&provider, &request()).await;
    let json = serde_json::to_string(&report)?;

    // The report is the machine-readable contract on stdout; spot-check the
    // shape an orchestrator would rely on
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["run_id"], "run-42");
    assert_eq!(value["status"]["state"], "completed");
    assert_eq!(value["pages_visited"], 1);
    assert_eq!(value["records"].as_array().map(|a| a.len()), Some(2));
    assert!(value["started_at"].is_string());

    let parsed: boardfoot::RunReport = serde_json::from_str(&json)?;
    assert_eq!(parsed.records, report.records);

    Ok(())
}
