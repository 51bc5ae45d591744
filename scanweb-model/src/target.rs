use url::Url;

use crate::error::ModelError;

/// Normalize user input into an absolute scan target.
///
/// Input is trimmed and a bare domain gets an `https://` prefix. The returned
/// string is otherwise the caller's text, not the parser's re-serialization,
/// because the injection heuristics look at the submitted characters.
pub fn normalize_target_url(raw: &str) -> Result<String, ModelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ModelError::InvalidTarget("url is empty".into()));
    }

    let candidate =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

    let parsed = Url::parse(&candidate)
        .map_err(|err| ModelError::InvalidTarget(format!("{trimmed}: {err}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ModelError::InvalidTarget(format!(
            "{trimmed}: missing host"
        )));
    }

    Ok(candidate)
}
