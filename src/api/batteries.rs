//! Battery API endpoints, including the derived alert and stats views.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{DataResponse, ListQuery, MessageResponse};
use crate::alerts::{self, AlertCategory, AlertThresholds};
use crate::errors::AppError;
use crate::models::{Battery, UpdateBatteryRequest};
use crate::stats::{self, FleetSummary};
use crate::AppState;

/// Battery list with pagination metadata.
#[derive(Debug, Serialize)]
pub struct BatteryList {
    pub batteries: Vec<Battery>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

/// GET /api/batteries - List all batteries.
pub async fn list_batteries(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<BatteryList>, AppError> {
    let batteries = state.repo.list_batteries().await?;
    let total = batteries.len();
    let limit = params.clamped_limit();
    let batteries = batteries.into_iter().skip(params.skip).take(limit).collect();

    Ok(Json(BatteryList {
        batteries,
        total,
        skip: params.skip,
        limit,
    }))
}

/// GET /api/batteries/:id - Get a single battery.
pub async fn get_battery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Battery>>, AppError> {
    let battery = state
        .repo
        .get_battery(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Battery {} not found", id)))?;

    Ok(Json(DataResponse::new(battery, "")))
}

/// PATCH /api/batteries/:id - Partially update a battery.
pub async fn update_battery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBatteryRequest>,
) -> Result<Json<DataResponse<Battery>>, AppError> {
    let battery = state.repo.update_battery(&id, &request).await?;

    Ok(Json(DataResponse::new(
        battery,
        "Battery updated successfully",
    )))
}

/// DELETE /api/batteries/:id - Delete a battery.
pub async fn delete_battery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.repo.delete_battery_by_id(&id).await?;

    Ok(Json(MessageResponse::new("Battery deleted successfully")))
}

/// POST /api/batteries/:id/reassign/:device_id - Move a battery to another device.
pub async fn reassign_battery(
    State(state): State<AppState>,
    Path((id, device_id)): Path<(String, String)>,
) -> Result<Json<DataResponse<Battery>>, AppError> {
    let battery = state.repo.reassign_battery(&id, &device_id).await?;

    Ok(Json(DataResponse::new(
        battery,
        "Battery reassigned successfully",
    )))
}

/// Query parameters for the low-capacity alert list.
#[derive(Debug, Deserialize)]
pub struct LowCapacityQuery {
    /// Optional per-request override of the configured low-capacity threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// GET /api/batteries/alerts/low_capacity - Batteries below the capacity threshold.
pub async fn low_capacity_alerts(
    State(state): State<AppState>,
    Query(params): Query<LowCapacityQuery>,
) -> Result<Json<Vec<Battery>>, AppError> {
    let mut thresholds = state.config.thresholds.clone();
    if let Some(threshold) = params.threshold {
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(AppError::Validation(
                "Threshold must be between 0 and 100 percent".to_string(),
            ));
        }
        thresholds.low_capacity = threshold;
    }

    list_by_category(&state, &thresholds, AlertCategory::LowCapacity).await
}

/// GET /api/batteries/alerts/need_replacment - Batteries that should be replaced.
///
/// The path spelling matches what the dashboard requests.
pub async fn need_replacement_alerts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Battery>>, AppError> {
    list_by_category(
        &state,
        &state.config.thresholds,
        AlertCategory::NeedsReplacement,
    )
    .await
}

/// Scan the current battery snapshot and keep those in the given category,
/// preserving store iteration order. Classification is never cached, so the
/// result always reflects the latest mutations.
async fn list_by_category(
    state: &AppState,
    thresholds: &AlertThresholds,
    category: AlertCategory,
) -> Result<Json<Vec<Battery>>, AppError> {
    let batteries = state.repo.list_batteries().await?;
    let matching = batteries
        .into_iter()
        .filter(|battery| alerts::classify(battery, thresholds).contains(&category))
        .collect();

    Ok(Json(matching))
}

/// GET /api/batteries/stats/summary - Fleet-wide aggregate metrics.
pub async fn battery_stats(
    State(state): State<AppState>,
) -> Result<Json<FleetSummary>, AppError> {
    let batteries = state.repo.list_batteries().await?;
    let summary = stats::summarize(&batteries, &state.config.thresholds);

    Ok(Json(summary))
}
