//! HTTP handlers for the dupwatch API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use dupwatch_core::{defaults, AlertEntry, BatchScanReport, DuplicateHit, Error, ScanConfig};
use dupwatch_scanner::{batch, trigger};
use dupwatch_tracker::ChangeEvent;

use crate::AppState;

/// JSON error envelope returned on every failure.
pub fn error_response(e: &Error) -> (StatusCode, Json<Value>) {
    let status = match e {
        Error::InvalidInput(_) | Error::Config(_) => StatusCode::BAD_REQUEST,
        Error::Search(_) | Error::Embedding(_) | Error::Inference(_) | Error::Request(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"error": e.to_string()})))
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<Value>)>;

fn map_err<T>(result: dupwatch_core::Result<T>) -> std::result::Result<T, (StatusCode, Json<Value>)> {
    result.map_err(|e| {
        error!(subsystem = "api", error = %e, "Request failed");
        error_response(&e)
    })
}

// =============================================================================
// Health
// =============================================================================

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

// =============================================================================
// Scanning
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ScanBatchRequest {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_batch_limit")]
    pub limit: usize,
    pub project_key: String,
}

fn default_batch_limit() -> usize {
    defaults::BATCH_ITEM_CAP
}

/// `POST /scan/batch` - scan a bounded slice of a project backlog.
pub async fn scan_batch(
    State(state): State<AppState>,
    Json(request): Json<ScanBatchRequest>,
) -> ApiResult<BatchScanReport> {
    let config = map_err(state.config.load().await)?;
    let report = map_err(
        batch::scan_backlog_batch(
            &state.engine,
            request.offset,
            request.limit,
            &request.project_key,
            &config,
        )
        .await,
    )?;
    Ok(Json(report))
}

/// `POST /scan/item/{key}` - deep scan for exactly one item.
pub async fn scan_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Vec<DuplicateHit>> {
    let config = map_err(state.config.load().await)?;
    let item = map_err(state.tracker.fetch_item(&key).await)?;
    let hits = map_err(
        state
            .engine
            .scan_item(&item, &config, defaults::SINGLE_CANDIDATE_LIMIT)
            .await,
    )?;
    Ok(Json(hits))
}

// =============================================================================
// Alerts
// =============================================================================

/// `GET /alerts/{key}` - stored alerts for one item (empty list if none).
pub async fn get_alert(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Vec<AlertEntry>> {
    let alerts = map_err(state.engine.alerts().get(&key).await)?;
    Ok(Json(alerts))
}

#[derive(Debug, Deserialize)]
pub struct DismissRequest {
    pub target_key: String,
}

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub success: bool,
}

/// `POST /alerts/{key}/dismiss` - permanently exclude a candidate pairing.
pub async fn dismiss_candidate(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<DismissRequest>,
) -> ApiResult<DismissResponse> {
    map_err(state.engine.ignores().dismiss(&key, &request.target_key).await)?;
    Ok(Json(DismissResponse { success: true }))
}

// =============================================================================
// Events
// =============================================================================

/// `POST /events/item-changed` - fire-and-forget trigger entry point.
///
/// The scan runs in a background task; the webhook caller only learns that
/// the event was accepted.
pub async fn item_changed(
    State(state): State<AppState>,
    Json(event): Json<ChangeEvent>,
) -> (StatusCode, Json<Value>) {
    let item_key = event.item.key.clone();
    info!(
        subsystem = "api",
        item_key = %item_key,
        "Item-changed event accepted"
    );

    tokio::spawn(async move {
        let config = match state.config.load().await {
            Ok(config) => config,
            Err(e) => {
                error!(subsystem = "api", item_key = %item_key, error = %e, "Config load failed");
                return;
            }
        };
        if let Err(e) =
            trigger::handle_item_changed(event, &state.engine, &state.tracker, &config).await
        {
            error!(
                subsystem = "api",
                item_key = %item_key,
                error = %e,
                "Triggered scan failed"
            );
        }
    });

    (StatusCode::ACCEPTED, Json(json!({"accepted": true})))
}

// =============================================================================
// Configuration
// =============================================================================

/// `GET /config` - the persisted scan configuration (defaults if unset).
pub async fn get_config(State(state): State<AppState>) -> ApiResult<ScanConfig> {
    let config = map_err(state.config.load().await)?;
    Ok(Json(config))
}

#[derive(Debug, Serialize)]
pub struct SaveConfigResponse {
    pub ok: bool,
    pub saved: ScanConfig,
}

/// `PUT /config` - replace the persisted scan configuration.
pub async fn save_config(
    State(state): State<AppState>,
    Json(config): Json<ScanConfig>,
) -> ApiResult<SaveConfigResponse> {
    map_err(state.config.save(&config).await)?;
    Ok(Json(SaveConfigResponse {
        ok: true,
        saved: config,
    }))
}
