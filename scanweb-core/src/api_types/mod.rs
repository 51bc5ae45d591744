//! DTOs exchanged between the HTTP service and its clients.

pub mod responses;
pub mod scans;

pub use responses::ApiResponse;
pub use scans::{
    CreateScanRequest, ScanListResponse, SubmitScanRequest,
    SubmitScanResponse,
};
