//! Device model matching the dashboard's device shape.

use serde::{Deserialize, Serialize};

use super::{validate_text, Battery};
use crate::errors::AppError;

/// Maximum length of a device name.
pub const MAX_DEVICE_NAME_LEN: usize = 100;
/// Maximum length of a firmware version string.
pub const MAX_FIRMWARE_VERSION_LEN: usize = 50;

/// A managed unit owning zero or more batteries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub firmware_version: String,
    pub is_active: bool,
    /// Owned batteries in insertion order.
    #[serde(default)]
    pub batteries: Vec<Battery>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new device.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub firmware_version: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl CreateDeviceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_text("Device name", &self.name, MAX_DEVICE_NAME_LEN)?;
        validate_text(
            "Firmware version",
            &self.firmware_version,
            MAX_FIRMWARE_VERSION_LEN,
        )?;
        Ok(())
    }
}

/// Request body for partially updating a device.
///
/// Absent fields are left untouched; present fields are validated like at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDeviceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UpdateDeviceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_text("Device name", name, MAX_DEVICE_NAME_LEN)?;
        }
        if let Some(version) = &self.firmware_version {
            validate_text("Firmware version", version, MAX_FIRMWARE_VERSION_LEN)?;
        }
        Ok(())
    }
}
