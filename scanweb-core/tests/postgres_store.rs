//! Requires a reachable `DATABASE_URL`; run with `cargo test -- --ignored`.

use scanweb_core::{
    ScanError,
    database::{
        NewScan, PostgresPrincipalResolver, PostgresScanRepository,
        PrincipalResolver, ScanCompletion, ScanRepository,
        repositories::principals::hash_token,
    },
};
use scanweb_model::{OwnerId, ScanStatus};
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrator = "scanweb_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn scan_lifecycle_round_trips(pool: PgPool) {
    let repo = PostgresScanRepository::new(pool);
    let owner = OwnerId(Uuid::new_v4());
    let scan = repo
        .create(NewScan {
            owner_id: owner,
            url: "https://example.com".into(),
        })
        .await
        .expect("create");
    assert_eq!(scan.status, ScanStatus::Pending);

    repo.mark_scanning(scan.id, owner).await.expect("scanning");
    repo.complete(
        scan.id,
        owner,
        ScanCompletion {
            vulnerabilities: None,
            ai_summary: "fine".into(),
            scan_duration: 10,
        },
    )
    .await
    .expect("complete");

    let stored = repo.get(scan.id, owner).await.unwrap().unwrap();
    assert_eq!(stored.status, ScanStatus::Completed);
    assert_eq!(stored.scan_duration, Some(10));
    assert!(stored.vulnerabilities.is_none());

    assert!(matches!(
        repo.fail(scan.id, owner, 1).await,
        Err(ScanError::StaleTransition { .. })
    ));
    assert!(matches!(
        repo.mark_scanning(scan.id, OwnerId(Uuid::new_v4())).await,
        Err(ScanError::NotFound(_))
    ));
}

#[sqlx::test(migrator = "scanweb_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn sessions_resolve_by_token_hash(pool: PgPool) {
    let owner = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, expires_at, revoked) \
         VALUES ($1, $2, NOW() + INTERVAL '1 hour', FALSE), \
                ($3, $2, NOW() - INTERVAL '1 hour', FALSE), \
                ($4, $2, NOW() + INTERVAL '1 hour', TRUE)",
    )
    .bind(hash_token("live"))
    .bind(owner)
    .bind(hash_token("expired"))
    .bind(hash_token("revoked"))
    .execute(&pool)
    .await
    .expect("seed sessions");

    let resolver = PostgresPrincipalResolver::new(pool);
    let principal = resolver.resolve("live").await.unwrap().unwrap();
    assert_eq!(principal.owner_id, OwnerId(owner));
    assert!(resolver.resolve("expired").await.unwrap().is_none());
    assert!(resolver.resolve("revoked").await.unwrap().is_none());
    assert!(resolver.resolve("unknown").await.unwrap().is_none());
}
