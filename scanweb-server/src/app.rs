use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::get,
};
use scanweb_core::api::routes::{HEALTH, PING};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{AppState, routes};

pub fn create_app(state: AppState) -> Router {
    let versioned_api = routes::create_api_router(state.clone());

    // Build CORS layer (permissive in dev, allow-list in prod)
    let cors_layer = if state.config().dev_mode {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config()
            .cors
            .allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route(PING, get(ping_handler))
        .route(HEALTH, get(health_handler))
        .merge(versioned_api)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping_handler() -> Json<Value> {
    info!("Ping endpoint called");
    Json(json!({
        "status": "ok",
        "message": "ScanWeb server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let backend = if state.postgres.is_some() {
        "postgres"
    } else {
        "memory"
    };

    let mut is_unhealthy = false;
    match state.scans().ping().await {
        Ok(()) => {
            health_status["checks"]["database"] = json!({
                "status": "healthy",
                "backend": backend,
            });
        }
        Err(e) => {
            warn!(error = %e, "health check: store unreachable");
            health_status["checks"]["database"] = json!({
                "status": "unhealthy",
                "backend": backend,
                "error": e.to_string()
            });
            is_unhealthy = true;
        }
    }

    if let Some(pg) = &state.postgres {
        let stats = pg.pool_stats();
        health_status["checks"]["pool"] = json!({
            "size": stats.size,
            "idle": stats.idle,
            "max_size": stats.max_size,
        });
    }

    if is_unhealthy {
        health_status["status"] = json!("unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, Json(health_status))
    } else {
        (StatusCode::OK, Json(health_status))
    }
}
