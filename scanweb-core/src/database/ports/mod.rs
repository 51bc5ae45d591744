//! Repository ports (interfaces). Services and the HTTP layer depend on
//! these; implementations live in [`super::repositories`] (Postgres) and
//! [`super::memory`].

pub mod principals;
pub mod scans;

pub use principals::{Principal, PrincipalResolver};
pub use scans::{NewScan, ScanCompletion, ScanRepository};
