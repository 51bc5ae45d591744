//! Pure heuristics over a fetched response. No I/O happens here so every
//! check can be exercised directly with a header map and a body string.

use reqwest::header::{HeaderMap, SERVER};
use scanweb_model::InfoDisclosure;

pub const BASIC_HEADERS: &[&str] = &[
    "x-frame-options",
    "content-security-policy",
    "strict-transport-security",
];

pub const EXTENDED_HEADERS: &[&str] = &[
    "x-frame-options",
    "content-security-policy",
    "strict-transport-security",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
    "cross-origin-embedder-policy",
];

pub const BASIC_SCRIPT_PATTERNS: &[&str] = &["<script>"];

pub const EXTENDED_SCRIPT_PATTERNS: &[&str] = &[
    "<script>",
    "javascript:",
    "onload=",
    "onerror=",
    "onclick=",
    "onmouseover=",
    "eval(",
    "alert(",
    "prompt(",
    "confirm(",
];

pub const SQLI_PATTERNS: &[&str] = &["'", "\"", "--", "/*", "*/"];

const POWERED_BY: &str = "x-powered-by";

/// Checklist entries absent from `headers`, in checklist order.
pub fn missing_headers(headers: &HeaderMap, checklist: &[&str]) -> Vec<String> {
    checklist
        .iter()
        .filter(|name| !headers.contains_key(**name))
        .map(|name| name.to_string())
        .collect()
}

/// Case-insensitive substring match of the body against the pattern list.
pub fn contains_script_patterns(body: &str, patterns: &[&str]) -> bool {
    let lowered = body.to_lowercase();
    patterns.iter().any(|pattern| lowered.contains(pattern))
}

/// Looks at the submitted URL only, never the response.
pub fn url_has_sqli_pattern(url: &str) -> bool {
    SQLI_PATTERNS.iter().any(|pattern| url.contains(pattern))
}

pub fn info_disclosure(headers: &HeaderMap) -> InfoDisclosure {
    let server = headers
        .get(SERVER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).to_lowercase())
        .unwrap_or_default();

    InfoDisclosure {
        server_header: !server.is_empty(),
        powered_by_header: headers.contains_key(POWERED_BY),
        php_version: server.contains("php"),
        asp_version: server.contains("asp"),
    }
}
