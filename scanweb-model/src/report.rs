use chrono::{DateTime, Utc};

use crate::{
    finding::Vulnerabilities,
    ids::ScanId,
    scan::{ScanRecord, ScanStatus},
};

/// Point-in-time export of a scan, in the shape existing report consumers
/// read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScanReport {
    pub url: String,
    pub scan_date: DateTime<Utc>,
    pub status: ScanStatus,
    pub duration: Option<i32>,
    pub vulnerabilities: Option<Vulnerabilities>,
    pub ai_summary: Option<String>,
}

impl From<&ScanRecord> for ScanReport {
    fn from(record: &ScanRecord) -> Self {
        Self {
            url: record.url.clone(),
            scan_date: record.created_at,
            status: record.status,
            duration: record.scan_duration,
            vulnerabilities: record.vulnerabilities.clone(),
            ai_summary: record.ai_summary.clone(),
        }
    }
}

/// Download name offered for an exported report.
pub fn report_file_name(id: &ScanId) -> String {
    format!("scan-report-{id}.json")
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::{
        finding::{Finding, Severity},
        ids::OwnerId,
    };
    use uuid::Uuid;

    #[test]
    fn export_round_trip_preserves_report_fields() {
        let mut vulnerabilities = Vulnerabilities::new();
        vulnerabilities.insert(
            "sql_injection_patterns".into(),
            Finding {
                finding_type: "SQL Injection Risk".into(),
                severity: Severity::Critical,
                description: "d".into(),
                recommendation: "r".into(),
                details: None,
            },
        );
        let record = ScanRecord {
            id: ScanId::new(),
            owner_id: OwnerId(Uuid::new_v4()),
            url: "https://example.com/?q='".into(),
            status: ScanStatus::Completed,
            vulnerabilities: Some(vulnerabilities),
            ai_summary: Some("All good.\n\n## Recommendations\n\n- a\n".into()),
            scan_duration: Some(12),
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
        };

        let report = ScanReport::from(&record);
        let json = serde_json::to_string_pretty(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("scanDate").is_some());
        assert!(value.get("aiSummary").is_some());
        assert_eq!(value["status"], "completed");
        assert_eq!(
            value["vulnerabilities"]["sql_injection_patterns"]["type"],
            "SQL Injection Risk"
        );

        let back: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url, record.url);
        assert_eq!(back.status, record.status);
        assert_eq!(back.vulnerabilities, record.vulnerabilities);
        assert_eq!(back.ai_summary, record.ai_summary);
    }

    #[test]
    fn file_name_embeds_scan_id() {
        let id = ScanId(Uuid::nil());
        assert_eq!(
            report_file_name(&id),
            "scan-report-00000000-0000-0000-0000-000000000000.json"
        );
    }
}
