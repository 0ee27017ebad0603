//! Device API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{DataResponse, ListQuery, MessageResponse};
use crate::errors::AppError;
use crate::models::{
    Battery, CreateBatteryRequest, CreateDeviceRequest, Device, UpdateDeviceRequest,
};
use crate::AppState;

/// Device list with pagination metadata.
#[derive(Debug, Serialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

/// GET /api/devices - List all devices with nested batteries.
pub async fn list_devices(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<DeviceList>, AppError> {
    let devices = state.repo.list_devices().await?;
    let total = devices.len();
    let limit = params.clamped_limit();
    let devices = devices.into_iter().skip(params.skip).take(limit).collect();

    Ok(Json(DeviceList {
        devices,
        total,
        skip: params.skip,
        limit,
    }))
}

/// GET /api/devices/:id - Get a single device with its batteries.
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Device>>, AppError> {
    let device = state
        .repo
        .get_device(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Device {} not found", id)))?;

    Ok(Json(DataResponse::new(device, "")))
}

/// POST /api/devices - Create a new device.
pub async fn create_device(
    State(state): State<AppState>,
    Json(request): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<DataResponse<Device>>), AppError> {
    let device = state.repo.create_device(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(device, "Device created successfully")),
    ))
}

/// PATCH /api/devices/:id - Partially update a device.
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDeviceRequest>,
) -> Result<Json<DataResponse<Device>>, AppError> {
    let device = state.repo.update_device(&id, &request).await?;

    Ok(Json(DataResponse::new(device, "Device updated successfully")))
}

/// DELETE /api/devices/:id - Delete a device and all of its batteries.
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.repo.delete_device(&id).await?;

    Ok(Json(MessageResponse::new("Device deleted successfully")))
}

/// POST /api/devices/:id/batteries - Create a battery under a device.
pub async fn create_device_battery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateBatteryRequest>,
) -> Result<(StatusCode, Json<DataResponse<Battery>>), AppError> {
    let battery = state.repo.create_battery(&id, &request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(
            battery,
            "Battery added to device successfully",
        )),
    ))
}

/// GET /api/devices/:id/batteries - List the batteries attached to a device.
pub async fn list_device_batteries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Battery>>, AppError> {
    let batteries = state.repo.batteries_for_device(&id).await?;

    Ok(Json(batteries))
}

/// DELETE /api/devices/:id/batteries/:battery_id - Remove a battery from a device.
pub async fn delete_device_battery(
    State(state): State<AppState>,
    Path((id, battery_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    state.repo.delete_battery(&id, &battery_id).await?;

    Ok(Json(MessageResponse::new(
        "Battery removed from device successfully",
    )))
}
