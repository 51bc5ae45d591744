use scanweb_model::{ScanRecord, ScanStats};
use serde::{Deserialize, Serialize};

/// Body of the submission endpoint. Both fields are optional on the wire so
/// a missing value can be answered with 400 instead of a decode rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScanRequest {
    #[serde(default)]
    pub scan_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl SubmitScanRequest {
    pub fn new(scan_id: impl ToString, url: impl Into<String>) -> Self {
        Self {
            scan_id: Some(scan_id.to_string()),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitScanResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitScanResponse {
    pub fn started() -> Self {
        Self {
            success: true,
            message: "Scan started".to_string(),
        }
    }

    pub fn finished() -> Self {
        Self {
            success: true,
            message: "Scan completed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScanRequest {
    pub url: String,
}

/// Dashboard listing: newest scans first plus counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanListResponse {
    pub scans: Vec<ScanRecord>,
    pub stats: ScanStats,
}

impl ScanListResponse {
    pub fn new(scans: Vec<ScanRecord>) -> Self {
        let stats = ScanStats::from_records(&scans);
        Self { scans, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_uses_camel_case_keys() {
        let body: SubmitScanRequest = serde_json::from_str(
            r#"{"scanId":"abc","url":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(body.scan_id.as_deref(), Some("abc"));
        assert_eq!(body.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn submit_request_tolerates_missing_fields() {
        let body: SubmitScanRequest =
            serde_json::from_str(r#"{"url":"x"}"#).unwrap();
        assert!(body.scan_id.is_none());
    }
}
