use axum::{
    Router, middleware,
    routing::{get, post},
};
use scanweb_core::api::routes::{utils::relative, v1};

use crate::{AppState, auth::auth_middleware, handlers::scans};

/// Create all v1 API routes. Every scan route requires a session.
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            relative(v1::scans::SUBMIT),
            post(scans::submit_scan_handler),
        )
        .route(
            relative(v1::scans::COLLECTION),
            get(scans::list_scans_handler).post(scans::create_scan_handler),
        )
        .route(relative(v1::scans::ITEM), get(scans::get_scan_handler))
        .route(
            relative(v1::scans::EXPORT),
            get(scans::export_scan_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
