pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod postgres;
#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod repositories;

pub use memory::{InMemoryPrincipalResolver, InMemoryScanRepository};
pub use ports::{
    NewScan, Principal, PrincipalResolver, ScanCompletion, ScanRepository,
};
#[cfg(feature = "database")]
pub use postgres::{PoolSettings, PoolStats, PostgresDatabase};
#[cfg(feature = "database")]
pub use repositories::{PostgresPrincipalResolver, PostgresScanRepository};
