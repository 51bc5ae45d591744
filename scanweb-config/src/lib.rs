//! Shared configuration library for ScanWeb.
//!
//! Configuration is layered: CLI flags (applied by the binaries), then the
//! process environment (after an optional `.env`), then a TOML file, then
//! built-in defaults. [`ConfigLoader`] composes the layers and applies the
//! guard rails in [`validation`].

#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, ScannerConfig,
    ServerConfig, SubmitMode, SummarizerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
