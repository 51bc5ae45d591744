//! Core data model definitions shared across ScanWeb crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod error;
pub mod finding;
pub mod heuristics;
pub mod ids;
pub mod report;
pub mod scan;
pub mod target;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use finding::{Finding, Severity, Vulnerabilities};
pub use heuristics::{HeuristicResult, InfoDisclosure};
pub use ids::{OwnerId, ScanId};
pub use report::{ScanReport, report_file_name};
pub use scan::{ScanRecord, ScanStats, ScanStatus};
pub use target::normalize_target_url;
