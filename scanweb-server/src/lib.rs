//! # ScanWeb Server
//!
//! HTTP front of the scan pipeline. Authenticated callers create scan
//! records, submit them for execution and read back the stored reports.
//!
//! The router is assembled by [`create_app`]; handlers reach the store and
//! the orchestrator through [`AppState`].

pub mod app;
pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::AppState;
