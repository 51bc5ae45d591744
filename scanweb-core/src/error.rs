use scanweb_model::{ModelError, ScanId, ScanStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Summary unavailable: {0}")]
    Summary(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Scan not found: {0}")]
    NotFound(ScanId),

    #[error("Scan {scan_id} cannot move to {target}")]
    StaleTransition { scan_id: ScanId, target: ScanStatus },

    #[error("Invalid scan target: {0}")]
    InvalidTarget(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ModelError> for ScanError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidTarget(msg) => ScanError::InvalidTarget(msg),
            other => ScanError::Internal(other.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for ScanError {
    fn from(err: sqlx::Error) -> Self {
        ScanError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
