use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::infra::{app_state::AppState, errors::AppError};

/// Resolve the bearer session and attach the
/// [`Principal`](scanweb_core::database::Principal) to the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    let principal = state
        .principals()
        .resolve(&token)
        .await
        .map_err(|err| {
            error!(error = %err, "session lookup failed");
            AppError::internal("Session lookup failed")
        })?
        .ok_or_else(|| {
            debug!("rejected unknown or expired session token");
            AppError::unauthorized("Invalid or expired session")
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
