use axum::{extract::State, http::StatusCode, Json};

use crate::render::Renderable;
use crate::tracker::{GeoPosition, TrackerCommand, TrackerStatus};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[utoipa::path(
    get,
    path = "/api/tracker/status",
    responses(
        (status = 200, description = "Tracker status", body = TrackerStatus)
    ),
    tag = "tracker"
)]
pub async fn status(State(state): State<AppState>) -> Json<TrackerStatus> {
    let status = state.status.lock().unwrap().clone();
    Json(status)
}

#[utoipa::path(
    get,
    path = "/api/planes",
    responses(
        (status = 200, description = "Tracked planes as rendered", body = Vec<Renderable>)
    ),
    tag = "tracker"
)]
pub async fn planes(State(state): State<AppState>) -> Json<Vec<Renderable>> {
    Json(state.scene.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/location",
    request_body = GeoPosition,
    responses(
        (status = 202, description = "Location queued for the tracker"),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 503, description = "Tracker not accepting commands", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn location(
    State(state): State<AppState>,
    Json(point): Json<GeoPosition>,
) -> ApiResult<StatusCode> {
    validate_location(&point)?;

    state
        .commands
        .send(TrackerCommand::SetCenter(point))
        .await
        .map_err(|_| ApiError::Unavailable("tracker_stopped"))?;

    Ok(StatusCode::ACCEPTED)
}

fn validate_location(point: &GeoPosition) -> ApiResult<()> {
    if !(-90.0..=90.0).contains(&point.latitude) {
        return Err(ApiError::Validation("latitude out of range".into()));
    }
    if !(-180.0..=180.0).contains(&point.longitude) {
        return Err(ApiError::Validation("longitude out of range".into()));
    }
    if !point.altitude_m.is_finite() {
        return Err(ApiError::Validation("altitude must be finite".into()));
    }
    Ok(())
}
