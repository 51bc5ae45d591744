//! # ScanWeb Core
//!
//! Core library for the ScanWeb service: the heuristic prober, the
//! summarizer client, the finding catalogue, the scan orchestrator and the
//! result poller, plus the persistence ports they share.
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL/SQLx store and embedded migrations
//!
//! ## Architecture
//!
//! - [`probe`]: one GET against the target and string heuristics over it
//! - [`summary`]: POST of the heuristics to the summarization endpoint
//! - [`findings`]: heuristic flags to stored findings
//! - [`orchestrator`]: `pending -> scanning -> completed | failed`
//! - [`poller`]: re-reads a scan until it is terminal
//! - [`database`]: repository ports, Postgres and in-memory stores
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use scanweb_core::{
//!     database::{InMemoryScanRepository, NewScan, ScanRepository},
//!     orchestrator::{PipelineConfig, ScanOrchestrator},
//!     probe::{HeuristicProber, ProbeSettings},
//!     summary::{SummarizerClient, SummarizerSettings},
//! };
//! use scanweb_model::OwnerId;
//!
//! async fn scan_once(owner_id: OwnerId) -> Result<(), Box<dyn std::error::Error>> {
//!     let scans = Arc::new(InMemoryScanRepository::new());
//!     let orchestrator = ScanOrchestrator::new(
//!         scans.clone(),
//!         Arc::new(HeuristicProber::new(ProbeSettings::default())?),
//!         Arc::new(SummarizerClient::new(SummarizerSettings::new(
//!             "https://summarizer.example.com",
//!         ))?),
//!         PipelineConfig::default(),
//!     );
//!
//!     let scan = scans
//!         .create(NewScan { owner_id, url: "https://example.com".into() })
//!         .await?;
//!     orchestrator.run(scan.id, &scan.url, owner_id).await;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Routes and transport DTOs shared by the server and its clients
pub mod api;
pub mod api_types;

/// Repository ports plus Postgres and in-memory implementations
pub mod database;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Error types and error handling utilities
pub mod error;

/// Heuristic flags to stored findings
pub mod findings;

/// Scan pipeline driver
pub mod orchestrator;

/// Completion tracking for clients
pub mod poller;

/// Target probing and the pure checks behind it
pub mod probe;

/// Remote summarization client
pub mod summary;

pub use error::{Result, ScanError};
pub use scanweb_model as model;
