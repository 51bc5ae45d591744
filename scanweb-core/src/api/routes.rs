macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and the CLI
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod scans {
        /// Start the pipeline for an existing pending scan.
        pub const SUBMIT: &str = v1_path!("/scan");
        pub const COLLECTION: &str = v1_path!("/scans");
        pub const ITEM: &str = v1_path!("/scans/{id}");
        pub const EXPORT: &str = v1_path!("/scans/{id}/export");
    }
}

pub const PING: &str = "/ping";
pub const HEALTH: &str = "/health";

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Strip the versioned prefix so a route can be mounted under a nested
    /// router.
    pub fn relative(route: &str) -> &str {
        route.strip_prefix(super::v1::ROOT).unwrap_or(route)
    }
}
