//! HTTP routes over [`RateService`]

use crate::core::error::RateError;
use crate::core::snapshot::{RatesInput, SnapshotView};
use crate::service::RateService;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                warn!(%message, "Rejected request");
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Internal(message) => {
                error!(%message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct SaveResult {
    path: String,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct ReadResult {
    path: String,
    imported: usize,
}

async fn get_latest(State(service): State<Arc<RateService>>) -> ApiResult<Json<SnapshotView>> {
    let snapshot = service.latest().await?;
    Ok(Json(SnapshotView::from(&snapshot)))
}

async fn create_snapshot(
    State(service): State<Arc<RateService>>,
    body: Bytes,
) -> ApiResult<Json<SnapshotView>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("request body is empty".to_string()));
    }
    let input: RatesInput = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;

    let snapshot = service.append(input).await?;
    Ok(Json(SnapshotView::from(&snapshot)))
}

async fn get_all(State(service): State<Arc<RateService>>) -> ApiResult<Json<Vec<SnapshotView>>> {
    let snapshots = service.all().await?;
    Ok(Json(snapshots.iter().map(SnapshotView::from).collect()))
}

async fn save_to_file(State(service): State<Arc<RateService>>) -> ApiResult<Json<SaveResult>> {
    let rows = service.save_to_file().await?;
    Ok(Json(SaveResult {
        path: service.export_path().display().to_string(),
        rows,
    }))
}

async fn read_from_file(State(service): State<Arc<RateService>>) -> ApiResult<Json<ReadResult>> {
    // Everything that goes wrong here is reported as a server error, including bad rows.
    let imported = service
        .read_from_file()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(ReadResult {
        path: service.export_path().display().to_string(),
        imported: imported.len(),
    }))
}

pub fn router(service: Arc<RateService>) -> Router {
    Router::new()
        .route("/currency", get(get_latest).post(create_snapshot))
        .route("/currencyAll", get(get_all))
        .route("/saveToFile", get(save_to_file))
        .route("/readFromFile", get(read_from_file))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

pub async fn serve(service: Arc<RateService>, listen_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
