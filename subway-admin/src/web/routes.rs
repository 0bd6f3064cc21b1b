//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{DomainError, LineId, SequenceError, StationId};
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations).post(create_station))
        .route("/stations/:id", delete(delete_station))
        .route("/lines", get(list_lines).post(create_line))
        .route(
            "/lines/:id",
            get(get_line).put(update_line).delete(delete_line),
        )
        .route(
            "/lines/:id/stations",
            get(list_line_stations).post(add_line_station),
        )
        .route(
            "/lines/:id/stations/:station_id",
            delete(remove_line_station),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body, logging it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(body = %String::from_utf8_lossy(body), "JSON parse error: {e}");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// 201 Created with a `Location` header and JSON body.
fn created<T: serde::Serialize>(location: String, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response()
}

// Stations

async fn create_station(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: StationCreateRequest = parse_json(&body)?;
    let station = state.store.create_station(&req.name).await?;

    Ok(created(
        format!("/stations/{}", station.id),
        StationResponse::from(&station),
    ))
}

async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResponse>> {
    let stations = state.store.stations().await;
    Json(stations.iter().map(StationResponse::from).collect())
}

async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<StationId>,
) -> Result<StatusCode, AppError> {
    state.store.delete_station(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Lines

async fn create_line(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: LineRequest = parse_json(&body)?;
    let line = state.store.create_line(req.into_schedule()?).await?;
    let detail = state.store.line(line.id).await?;

    Ok(created(
        format!("/lines/{}", line.id),
        LineResponse::from(&detail),
    ))
}

async fn list_lines(State(state): State<AppState>) -> Result<Json<Vec<LineResponse>>, AppError> {
    let lines = state.store.lines().await?;
    Ok(Json(lines.iter().map(LineResponse::from).collect()))
}

async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<LineId>,
) -> Result<Json<LineResponse>, AppError> {
    let detail = state.store.line(id).await?;
    Ok(Json(LineResponse::from(&detail)))
}

async fn update_line(
    State(state): State<AppState>,
    Path(id): Path<LineId>,
    body: Bytes,
) -> Result<Json<LineResponse>, AppError> {
    let req: LineRequest = parse_json(&body)?;
    state.store.update_line(id, req.into_schedule()?).await?;
    let detail = state.store.line(id).await?;
    Ok(Json(LineResponse::from(&detail)))
}

async fn delete_line(
    State(state): State<AppState>,
    Path(id): Path<LineId>,
) -> Result<StatusCode, AppError> {
    state.store.delete_line(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Line stations

async fn add_line_station(
    State(state): State<AppState>,
    Path(line_id): Path<LineId>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: LineStationCreateRequest = parse_json(&body)?;
    let entry = state
        .store
        .add_line_station(
            line_id,
            StationId(req.station_id),
            req.pre_station_id.map(StationId),
            req.distance,
            req.duration,
        )
        .await?;

    Ok(created(
        format!("/lines/{}/stations/{}", line_id, entry.station_id),
        LineStationResponse::from(&entry),
    ))
}

async fn list_line_stations(
    State(state): State<AppState>,
    Path(line_id): Path<LineId>,
) -> Result<Json<Vec<LineStationResponse>>, AppError> {
    let entries = state.store.line_stations(line_id).await?;
    Ok(Json(entries.iter().map(LineStationResponse::from).collect()))
}

async fn remove_line_station(
    State(state): State<AppState>,
    Path((line_id, station_id)): Path<(LineId, StationId)>,
) -> Result<StatusCode, AppError> {
    state.store.remove_line_station(line_id, station_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::DuplicateStationName(_)
            | StoreError::DuplicateLineName(_)
            | StoreError::Invalid(_)
            | StoreError::Sequence(SequenceError::InvalidReference(_))
            | StoreError::Sequence(SequenceError::AlreadyInLine(_)) => {
                AppError::BadRequest { message }
            }
            StoreError::StationNotFound(_)
            | StoreError::LineNotFound(_)
            | StoreError::Sequence(SequenceError::NotInLine(_)) => AppError::NotFound { message },
            StoreError::Sequence(SequenceError::BrokenChain(_)) | StoreError::Snapshot { .. } => {
                AppError::Internal { message }
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
