use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};

use crate::{
    error::ModelError,
    finding::Vulnerabilities,
    ids::{OwnerId, ScanId},
};

/// Lifecycle of a scan record. Transitions only move forward:
/// `Pending -> Scanning -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScanStatus {
    Pending,
    Scanning,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Scanning => "scanning",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }

    /// Whether `next` is the single permitted successor of `self`.
    pub fn can_advance_to(&self, next: ScanStatus) -> bool {
        matches!(
            (self, next),
            (ScanStatus::Pending, ScanStatus::Scanning)
                | (ScanStatus::Scanning, ScanStatus::Completed)
                | (ScanStatus::Scanning, ScanStatus::Failed)
        )
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScanStatus::Pending),
            "scanning" => Ok(ScanStatus::Scanning),
            "completed" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            other => Err(ModelError::InvalidStatus(other.to_string())),
        }
    }
}

/// The persisted scan job.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanRecord {
    pub id: ScanId,
    pub owner_id: OwnerId,
    pub url: String,
    pub status: ScanStatus,
    pub vulnerabilities: Option<Vulnerabilities>,
    pub ai_summary: Option<String>,
    pub scan_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanRecord {
    pub fn vulnerability_count(&self) -> usize {
        self.vulnerabilities.as_ref().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Dashboard counters over a principal's scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub failed: usize,
}

impl ScanStats {
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a ScanRecord>,
    ) -> Self {
        let mut stats = ScanStats::default();
        for record in records {
            stats.total += 1;
            match record.status {
                ScanStatus::Completed => stats.completed += 1,
                ScanStatus::Failed => stats.failed += 1,
                ScanStatus::Pending | ScanStatus::Scanning => {
                    stats.in_progress += 1
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(status: ScanStatus) -> ScanRecord {
        ScanRecord {
            id: ScanId::new(),
            owner_id: OwnerId(Uuid::new_v4()),
            url: "https://example.com".into(),
            status,
            vulnerabilities: None,
            ai_summary: None,
            scan_duration: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn only_forward_transitions_are_allowed() {
        use ScanStatus::*;
        let all = [Pending, Scanning, Completed, Failed];
        let allowed: Vec<_> = all
            .iter()
            .flat_map(|from| all.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_advance_to(*to))
            .collect();

        assert_eq!(
            allowed,
            vec![(Pending, Scanning), (Scanning, Completed), (Scanning, Failed)]
        );
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ScanStatus::Pending,
            ScanStatus::Scanning,
            ScanStatus::Completed,
            ScanStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<ScanStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<ScanStatus>().is_err());
    }

    #[test]
    fn stats_group_pending_and_scanning_as_in_progress() {
        let records = [
            record(ScanStatus::Pending),
            record(ScanStatus::Scanning),
            record(ScanStatus::Completed),
            record(ScanStatus::Failed),
            record(ScanStatus::Completed),
        ];
        let stats = ScanStats::from_records(&records);
        assert_eq!(
            stats,
            ScanStats {
                total: 5,
                completed: 2,
                in_progress: 2,
                failed: 1,
            }
        );
    }
}
