//! PostgreSQL-backed repository implementations.

pub mod principals;
pub mod scans;

pub use principals::PostgresPrincipalResolver;
pub use scans::PostgresScanRepository;
