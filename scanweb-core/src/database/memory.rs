//! In-process stores used by tests and by dev mode when no database is
//! configured. State lives only as long as the process.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use scanweb_model::{OwnerId, ScanId, ScanRecord, ScanStatus};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    database::ports::{
        NewScan, Principal, PrincipalResolver, ScanCompletion, ScanRepository,
    },
    error::{Result, ScanError},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryScanRepository {
    scans: Arc<Mutex<HashMap<ScanId, ScanRecord>>>,
}

impl InMemoryScanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `update` if the record exists for `owner_id` and may advance to
    /// `target`.
    async fn transition(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        target: ScanStatus,
        update: impl FnOnce(&mut ScanRecord),
    ) -> Result<()> {
        let mut guard = self.scans.lock().await;
        let record = guard
            .get_mut(&scan_id)
            .filter(|record| record.owner_id == owner_id)
            .ok_or(ScanError::NotFound(scan_id))?;

        if !record.status.can_advance_to(target) {
            return Err(ScanError::StaleTransition { scan_id, target });
        }

        record.status = target;
        update(record);
        Ok(())
    }
}

#[async_trait]
impl ScanRepository for InMemoryScanRepository {
    async fn create(&self, scan: NewScan) -> Result<ScanRecord> {
        let record = ScanRecord {
            id: ScanId::new(),
            owner_id: scan.owner_id,
            url: scan.url,
            status: ScanStatus::Pending,
            vulnerabilities: None,
            ai_summary: None,
            scan_duration: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.scans.lock().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
    ) -> Result<Option<ScanRecord>> {
        let guard = self.scans.lock().await;
        Ok(guard
            .get(&scan_id)
            .filter(|record| record.owner_id == owner_id)
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: OwnerId) -> Result<Vec<ScanRecord>> {
        let guard = self.scans.lock().await;
        let mut records: Vec<ScanRecord> = guard
            .values()
            .filter(|record| record.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn mark_scanning(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
    ) -> Result<()> {
        self.transition(scan_id, owner_id, ScanStatus::Scanning, |_| {})
            .await
    }

    async fn complete(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        completion: ScanCompletion,
    ) -> Result<()> {
        self.transition(scan_id, owner_id, ScanStatus::Completed, |record| {
            record.vulnerabilities = completion.vulnerabilities;
            record.ai_summary = Some(completion.ai_summary);
            record.scan_duration = Some(completion.scan_duration);
            record.completed_at = Some(Utc::now());
        })
        .await
    }

    async fn fail(
        &self,
        scan_id: ScanId,
        owner_id: OwnerId,
        scan_duration: i32,
    ) -> Result<()> {
        self.transition(scan_id, owner_id, ScanStatus::Failed, |record| {
            record.scan_duration = Some(scan_duration);
            record.completed_at = Some(Utc::now());
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Token table kept in memory. Tokens never expire.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrincipalResolver {
    tokens: Arc<Mutex<HashMap<String, OwnerId>>>,
}

impl InMemoryPrincipalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, token: impl Into<String>, owner_id: OwnerId) {
        self.tokens.lock().await.insert(token.into(), owner_id);
    }

    /// Mint a random token for `owner_id`.
    pub async fn issue(&self, owner_id: OwnerId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.insert(token.clone(), owner_id).await;
        token
    }
}

#[async_trait]
impl PrincipalResolver for InMemoryPrincipalResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Principal>> {
        let guard = self.tokens.lock().await;
        Ok(guard
            .get(token)
            .copied()
            .map(|owner_id| Principal { owner_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId(Uuid::new_v4())
    }

    async fn pending(repo: &InMemoryScanRepository, owner_id: OwnerId) -> ScanRecord {
        repo.create(NewScan {
            owner_id,
            url: "https://example.com".into(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn created_scan_is_pending_without_results() {
        let repo = InMemoryScanRepository::new();
        let record = pending(&repo, owner()).await;
        assert_eq!(record.status, ScanStatus::Pending);
        assert!(record.vulnerabilities.is_none());
        assert!(record.ai_summary.is_none());
        assert!(record.scan_duration.is_none());
        assert!(record.completed_at.is_none());
    }

    #[tokio::test]
    async fn reads_are_owner_scoped() {
        let repo = InMemoryScanRepository::new();
        let alice = owner();
        let bob = owner();
        let record = pending(&repo, alice).await;

        assert!(repo.get(record.id, bob).await.unwrap().is_none());
        assert!(repo.list_for_owner(bob).await.unwrap().is_empty());
        assert!(matches!(
            repo.mark_scanning(record.id, bob).await,
            Err(ScanError::NotFound(_))
        ));
        assert_eq!(
            repo.get(record.id, alice).await.unwrap().unwrap().status,
            ScanStatus::Pending
        );
    }

    #[tokio::test]
    async fn transitions_only_move_forward() {
        let repo = InMemoryScanRepository::new();
        let alice = owner();
        let record = pending(&repo, alice).await;

        assert!(matches!(
            repo.fail(record.id, alice, 1).await,
            Err(ScanError::StaleTransition {
                target: ScanStatus::Failed,
                ..
            })
        ));

        repo.mark_scanning(record.id, alice).await.unwrap();
        repo.fail(record.id, alice, 3).await.unwrap();

        let completion = ScanCompletion {
            vulnerabilities: None,
            ai_summary: "late".into(),
            scan_duration: 4,
        };
        assert!(matches!(
            repo.complete(record.id, alice, completion).await,
            Err(ScanError::StaleTransition { .. })
        ));

        let stored = repo.get(record.id, alice).await.unwrap().unwrap();
        assert_eq!(stored.status, ScanStatus::Failed);
        assert_eq!(stored.scan_duration, Some(3));
        assert!(stored.ai_summary.is_none());
        assert!(stored.vulnerabilities.is_none());
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn issued_tokens_resolve_to_owner() {
        let resolver = InMemoryPrincipalResolver::new();
        let alice = owner();
        let token = resolver.issue(alice).await;

        let principal = resolver.resolve(&token).await.unwrap().unwrap();
        assert_eq!(principal.owner_id, alice);
        assert!(resolver.resolve("nope").await.unwrap().is_none());
    }
}
