use axum::{
    Extension,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
};
use scanweb_config::SubmitMode;
use scanweb_core::{
    api_types::{
        ApiResponse, CreateScanRequest, ScanListResponse, SubmitScanRequest,
        SubmitScanResponse,
    },
    database::{NewScan, Principal},
    model::{
        ScanId, ScanRecord, ScanReport, normalize_target_url, report_file_name,
    },
    orchestrator::ScanRunOutcome,
};
use tracing::{debug, info};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// `POST /api/v1/scan`: run the pipeline for an existing `pending` record.
///
/// In detached mode the run is spawned and the response is immediate; the
/// outcome is only visible through the record. In blocking mode the
/// response is sent after the record reached a terminal state.
pub async fn submit_scan_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<SubmitScanRequest>, JsonRejection>,
) -> AppResult<Json<SubmitScanResponse>> {
    let Json(request) =
        payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let (Some(raw_id), Some(raw_url)) = (
        non_blank(request.scan_id.as_deref()),
        non_blank(request.url.as_deref()),
    ) else {
        return Err(AppError::bad_request("Missing scanId or url"));
    };

    let scan_id = parse_scan_id(raw_id)?;
    let requested = normalize_target_url(raw_url)
        .map_err(|err| AppError::bad_request(err.to_string()))?;
    let owner_id = principal.owner_id;

    let record = state
        .scans()
        .get(scan_id, owner_id)
        .await?
        .ok_or_else(|| AppError::not_found("Scan not found"))?;

    // The record's target is probed; the body url is only validated.
    if requested != record.url {
        debug!(
            %scan_id,
            requested = %requested,
            stored = %record.url,
            "submitted url differs from record; using stored url"
        );
    }
    let url = record.url;

    let orchestrator = state.orchestrator().clone();
    match state.submit_mode() {
        SubmitMode::Detached => {
            tokio::spawn(async move {
                let outcome = orchestrator.run(scan_id, &url, owner_id).await;
                log_outcome(scan_id, &outcome);
            });
            Ok(Json(SubmitScanResponse::started()))
        }
        SubmitMode::Blocking => {
            let outcome = orchestrator.run(scan_id, &url, owner_id).await;
            log_outcome(scan_id, &outcome);
            Ok(Json(SubmitScanResponse::finished()))
        }
    }
}

/// `POST /api/v1/scans`: create a `pending` record for the caller.
pub async fn create_scan_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateScanRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) =
        payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let url = normalize_target_url(&request.url)
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    let record = state
        .scans()
        .create(NewScan {
            owner_id: principal.owner_id,
            url,
        })
        .await?;
    info!(scan_id = %record.id, url = %record.url, "scan created");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

pub async fn list_scans_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AppResult<Json<ApiResponse<ScanListResponse>>> {
    let scans = state.scans().list_for_owner(principal.owner_id).await?;
    Ok(Json(ApiResponse::success(ScanListResponse::new(scans))))
}

/// `GET /api/v1/scans/{id}`: the read the result poller repeats.
pub async fn get_scan_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ScanRecord>>> {
    let record = load_owned(&state, &principal, &id).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// `GET /api/v1/scans/{id}/export`: the report as a JSON download.
pub async fn export_scan_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = load_owned(&state, &principal, &id).await?;
    let report = ScanReport::from(&record);
    let body = serde_json::to_string_pretty(&report)
        .map_err(|err| AppError::internal(err.to_string()))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(&record.id)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

async fn load_owned(
    state: &AppState,
    principal: &Principal,
    raw_id: &str,
) -> AppResult<ScanRecord> {
    let scan_id = parse_scan_id(raw_id)?;
    state
        .scans()
        .get(scan_id, principal.owner_id)
        .await?
        .ok_or_else(|| AppError::not_found("Scan not found"))
}

fn parse_scan_id(raw: &str) -> AppResult<ScanId> {
    raw.trim()
        .parse::<ScanId>()
        .map_err(|_| AppError::bad_request(format!("Invalid scan id: {raw}")))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn log_outcome(scan_id: ScanId, outcome: &ScanRunOutcome) {
    match outcome {
        ScanRunOutcome::Completed {
            findings,
            scan_duration,
        } => debug!(%scan_id, findings, scan_duration, "submission finished"),
        ScanRunOutcome::Failed { reason } | ScanRunOutcome::Aborted { reason } => {
            debug!(%scan_id, reason = %reason, "submission ended without a report")
        }
    }
}
