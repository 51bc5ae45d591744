//! Fixed mapping from heuristic flags to stored findings. The texts are read
//! by existing report consumers and must not drift.

use scanweb_model::{Finding, HeuristicResult, Severity, Vulnerabilities};

pub const MISSING_SECURITY_HEADERS: &str = "missing_security_headers";
pub const POTENTIAL_XSS: &str = "potential_xss";
pub const SQL_INJECTION_PATTERNS: &str = "sql_injection_patterns";
pub const SERVER_INFORMATION_DISCLOSURE: &str = "server_information_disclosure";
pub const TECHNOLOGY_DISCLOSURE: &str = "technology_disclosure";
pub const VERSION_DISCLOSURE: &str = "version_disclosure";

fn finding(
    finding_type: &str,
    severity: Severity,
    description: impl Into<String>,
    recommendation: &str,
    details: Option<Vec<String>>,
) -> Finding {
    Finding {
        finding_type: finding_type.to_string(),
        severity,
        description: description.into(),
        recommendation: recommendation.to_string(),
        details,
    }
}

/// Build the `vulnerabilities` mapping for a successful probe. Returns `None`
/// when nothing was flagged so an empty map is never stored.
pub fn build_vulnerabilities(
    results: &HeuristicResult,
) -> Option<Vulnerabilities> {
    let mut found = Vulnerabilities::new();

    if !results.missing_headers.is_empty() {
        found.insert(
            MISSING_SECURITY_HEADERS.to_string(),
            finding(
                "Missing Security Headers",
                Severity::High,
                format!(
                    "The following security headers are missing: {}",
                    results.missing_headers.join(", ")
                ),
                "Add these security headers to protect against common attacks like clickjacking, XSS, and protocol downgrade attacks.",
                Some(results.missing_headers.clone()),
            ),
        );
    }

    if results.script_tags_found {
        found.insert(
            POTENTIAL_XSS.to_string(),
            finding(
                "Potential XSS Vulnerability",
                Severity::Medium,
                "Script tags were found in the page content, which may indicate XSS vulnerabilities if user input is not properly sanitized.",
                "Review all user input handling and ensure proper sanitization and encoding of data before rendering.",
                None,
            ),
        );
    }

    if results.sqli_risk {
        found.insert(
            SQL_INJECTION_PATTERNS.to_string(),
            finding(
                "SQL Injection Risk",
                Severity::Critical,
                "The URL contains patterns commonly associated with SQL injection attacks.",
                "Use parameterized queries and prepared statements. Never concatenate user input directly into SQL queries.",
                None,
            ),
        );
    }

    if let Some(disclosure) = results.info_disclosure {
        if disclosure.server_header {
            found.insert(
                SERVER_INFORMATION_DISCLOSURE.to_string(),
                finding(
                    "Server Information Disclosure",
                    Severity::Low,
                    "The server header reveals information about the web server software.",
                    "Remove or obfuscate the server header to avoid revealing server details to potential attackers.",
                    None,
                ),
            );
        }

        if disclosure.powered_by_header {
            found.insert(
                TECHNOLOGY_DISCLOSURE.to_string(),
                finding(
                    "Technology Stack Disclosure",
                    Severity::Low,
                    "The X-Powered-By header reveals the technology stack used by the application.",
                    "Remove the X-Powered-By header to prevent technology stack disclosure.",
                    None,
                ),
            );
        }

        let technologies: Vec<String> = [
            (disclosure.php_version, "PHP"),
            (disclosure.asp_version, "ASP"),
        ]
        .into_iter()
        .filter_map(|(flagged, name)| flagged.then(|| name.to_string()))
        .collect();

        if !technologies.is_empty() {
            found.insert(
                VERSION_DISCLOSURE.to_string(),
                finding(
                    "Server Technology Version Disclosure",
                    Severity::Medium,
                    "The server header reveals the server-side technology and possibly its version, which helps attackers target known vulnerabilities.",
                    "Configure the server to omit technology and version details from response headers and keep the runtime up to date.",
                    Some(technologies),
                ),
            );
        }
    }

    (!found.is_empty()).then_some(found)
}
