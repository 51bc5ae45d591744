//! Client side of ScanWeb: an HTTP client for the scan API and the helpers
//! the `scanwebctl` binary prints and saves results with.

#![allow(missing_docs)]

pub mod client;
pub mod output;

pub use client::{ApiClient, ClientError, ExportedReport};
