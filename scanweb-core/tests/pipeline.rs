mod support;

use std::{sync::Arc, time::Duration};

use axum::http::StatusCode;
use scanweb_core::{
    database::{InMemoryScanRepository, NewScan, ScanRepository},
    findings,
    orchestrator::{PipelineConfig, ScanOrchestrator, ScanRunOutcome},
    probe::{HeuristicProber, ProbeProfile, ProbeSettings},
    summary::{SUMMARY_UNAVAILABLE, SummarizerClient, SummarizerSettings},
};
use scanweb_model::{OwnerId, ScanStatus, Severity};
use uuid::Uuid;

fn orchestrator(
    repo: &InMemoryScanRepository,
    summarizer_endpoint: String,
) -> ScanOrchestrator {
    ScanOrchestrator::new(
        Arc::new(repo.clone()),
        Arc::new(
            HeuristicProber::new(ProbeSettings {
                profile: ProbeProfile::Basic,
                timeout: Duration::from_secs(2),
                ..ProbeSettings::default()
            })
            .expect("probe client"),
        ),
        Arc::new(
            SummarizerClient::new(SummarizerSettings {
                endpoint: summarizer_endpoint,
                timeout: Some(Duration::from_secs(2)),
            })
            .expect("summarizer client"),
        ),
        PipelineConfig {
            probe_deadline: Some(Duration::from_secs(5)),
            min_duration: None,
        },
    )
}

#[tokio::test]
async fn scan_completes_with_findings_and_summary() {
    let site = support::target_site(
        &[("x-frame-options", "DENY")],
        "<p>hello</p><script>alert(1)</script>",
        Duration::ZERO,
    )
    .await;
    let ai = support::summarizer(
        StatusCode::OK,
        r#"{"summary":"Needs work.","recommendations":["Add HSTS"]}"#,
        Duration::ZERO,
    )
    .await;

    let repo = InMemoryScanRepository::new();
    let owner = OwnerId(Uuid::new_v4());
    let scan = repo
        .create(NewScan {
            owner_id: owner,
            url: format!("{}?q=a'b", site.url()),
        })
        .await
        .unwrap();

    let outcome = orchestrator(&repo, ai.endpoint())
        .run(scan.id, &scan.url, owner)
        .await;
    assert!(matches!(outcome, ScanRunOutcome::Completed { findings: 3, .. }));

    let record = repo.get(scan.id, owner).await.unwrap().unwrap();
    assert_eq!(record.status, ScanStatus::Completed);
    assert_eq!(
        record.ai_summary.as_deref(),
        Some("Needs work.\n\n## Recommendations\n\n- Add HSTS\n")
    );
    assert!(record.scan_duration.is_some());
    assert!(record.completed_at.is_some());

    let found = record.vulnerabilities.expect("findings");
    assert_eq!(
        found[findings::MISSING_SECURITY_HEADERS].details,
        Some(vec![
            "content-security-policy".to_string(),
            "strict-transport-security".to_string(),
        ])
    );
    assert_eq!(found[findings::POTENTIAL_XSS].severity, Severity::Medium);
    assert_eq!(
        found[findings::SQL_INJECTION_PATTERNS].severity,
        Severity::Critical
    );
}

#[tokio::test]
async fn unreachable_summarizer_still_completes() {
    let site = support::target_site(
        &[
            ("x-frame-options", "DENY"),
            ("content-security-policy", "default-src 'self'"),
            ("strict-transport-security", "max-age=63072000"),
        ],
        "<p>static</p>",
        Duration::ZERO,
    )
    .await;
    let ai = support::summarizer(
        StatusCode::BAD_GATEWAY,
        "{}",
        Duration::ZERO,
    )
    .await;

    let repo = InMemoryScanRepository::new();
    let owner = OwnerId(Uuid::new_v4());
    let scan = repo
        .create(NewScan {
            owner_id: owner,
            url: site.url(),
        })
        .await
        .unwrap();

    orchestrator(&repo, ai.endpoint())
        .run(scan.id, &scan.url, owner)
        .await;

    let record = repo.get(scan.id, owner).await.unwrap().unwrap();
    assert_eq!(record.status, ScanStatus::Completed);
    assert!(record.vulnerabilities.is_none());
    assert_eq!(record.ai_summary.as_deref(), Some(SUMMARY_UNAVAILABLE));
}

#[tokio::test]
async fn unreachable_target_fails_and_skips_summary() {
    let ai = support::summarizer(
        StatusCode::OK,
        r#"{"summary":"should not be asked"}"#,
        Duration::ZERO,
    )
    .await;
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let repo = InMemoryScanRepository::new();
    let owner = OwnerId(Uuid::new_v4());
    let scan = repo
        .create(NewScan {
            owner_id: owner,
            url: format!("http://{closed}/"),
        })
        .await
        .unwrap();

    let outcome = orchestrator(&repo, ai.endpoint())
        .run(scan.id, &scan.url, owner)
        .await;
    assert!(matches!(outcome, ScanRunOutcome::Failed { .. }));

    let record = repo.get(scan.id, owner).await.unwrap().unwrap();
    assert_eq!(record.status, ScanStatus::Failed);
    assert!(record.scan_duration.is_some());
    assert!(record.vulnerabilities.is_none());
    assert!(record.ai_summary.is_none());
    assert!(ai.requests.lock().unwrap().is_empty());
}
