/// Flags derived from the `server` and `x-powered-by` response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoDisclosure {
    /// A non-empty `server` header was returned.
    pub server_header: bool,
    /// Any `x-powered-by` header was returned.
    pub powered_by_header: bool,
    /// The `server` header mentions PHP.
    pub php_version: bool,
    /// The `server` header mentions ASP.
    pub asp_version: bool,
}

impl InfoDisclosure {
    pub fn any(&self) -> bool {
        self.server_header
            || self.powered_by_header
            || self.php_version
            || self.asp_version
    }
}

/// Result of probing one target URL. This is also the payload forwarded to
/// the summarizer, so the field names are part of that contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeuristicResult {
    pub missing_headers: Vec<String>,
    pub script_tags_found: bool,
    pub sqli_risk: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub info_disclosure: Option<InfoDisclosure>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub error: Option<String>,
}

impl HeuristicResult {
    /// Result shape used when the target could not be fetched: every
    /// heuristic keeps its default and only the error text is set.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
