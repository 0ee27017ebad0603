//! Battery model matching the dashboard's battery shape.

use serde::{Deserialize, Serialize};

use super::validate_text;
use crate::errors::AppError;

/// Maximum length of a battery name.
pub const MAX_BATTERY_NAME_LEN: usize = 100;
/// Upper bound on nominal voltage, in volts.
pub const MAX_NOMINAL_VOLTAGE: f64 = 1000.0;
/// Upper bound on service life, in days (ten years).
pub const MAX_SERVICE_LIFE_DAYS: i64 = 3650;

/// A power-storage component belonging to exactly one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battery {
    pub id: String,
    pub device_id: String,
    pub name: String,
    /// Nominal voltage in volts.
    pub nominal_voltage: f64,
    /// Residual capacity in percent, always within `[0, 100]`.
    pub residual_capacity: f64,
    /// Service life in days. Whether this counts elapsed or remaining days is
    /// a deployment-level interpretation, see `ServiceLifeSemantics`.
    pub service_life: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new battery under a device.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatteryRequest {
    pub name: String,
    pub nominal_voltage: f64,
    pub residual_capacity: f64,
    pub service_life: i64,
}

impl CreateBatteryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_text("Battery name", &self.name, MAX_BATTERY_NAME_LEN)?;
        validate_nominal_voltage(self.nominal_voltage)?;
        validate_residual_capacity(self.residual_capacity)?;
        validate_service_life(self.service_life)?;
        Ok(())
    }
}

/// Request body for partially updating a battery.
///
/// Absent fields are left untouched; present fields are validated like at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBatteryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nominal_voltage: Option<f64>,
    #[serde(default)]
    pub residual_capacity: Option<f64>,
    #[serde(default)]
    pub service_life: Option<i64>,
}

impl UpdateBatteryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_text("Battery name", name, MAX_BATTERY_NAME_LEN)?;
        }
        if let Some(voltage) = self.nominal_voltage {
            validate_nominal_voltage(voltage)?;
        }
        if let Some(capacity) = self.residual_capacity {
            validate_residual_capacity(capacity)?;
        }
        if let Some(life) = self.service_life {
            validate_service_life(life)?;
        }
        Ok(())
    }
}

fn validate_nominal_voltage(voltage: f64) -> Result<(), AppError> {
    if !voltage.is_finite() || voltage <= 0.0 || voltage > MAX_NOMINAL_VOLTAGE {
        return Err(AppError::Validation(format!(
            "Nominal voltage must be greater than 0 and at most {} volts",
            MAX_NOMINAL_VOLTAGE
        )));
    }
    Ok(())
}

/// Out-of-range capacities are rejected, never clamped.
fn validate_residual_capacity(capacity: f64) -> Result<(), AppError> {
    if !capacity.is_finite() || !(0.0..=100.0).contains(&capacity) {
        return Err(AppError::Validation(
            "Residual capacity must be between 0 and 100 percent".to_string(),
        ));
    }
    Ok(())
}

fn validate_service_life(days: i64) -> Result<(), AppError> {
    if !(0..=MAX_SERVICE_LIFE_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "Service life must be between 0 and {} days",
            MAX_SERVICE_LIFE_DAYS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateBatteryRequest {
        CreateBatteryRequest {
            name: "Battery_001".to_string(),
            nominal_voltage: 12.0,
            residual_capacity: 95.5,
            service_life: 365,
        }
    }

    #[test]
    fn test_capacity_bounds_are_inclusive() {
        for capacity in [0.0, 100.0] {
            let request = CreateBatteryRequest {
                residual_capacity: capacity,
                ..valid_request()
            };
            assert!(request.validate().is_ok(), "capacity {} should pass", capacity);
        }

        for capacity in [-0.1, 100.1, 150.0, f64::NAN] {
            let request = CreateBatteryRequest {
                residual_capacity: capacity,
                ..valid_request()
            };
            assert!(request.validate().is_err(), "capacity {} should fail", capacity);
        }
    }

    #[test]
    fn test_voltage_must_be_positive() {
        for voltage in [0.0, -12.0, 1000.5] {
            let request = CreateBatteryRequest {
                nominal_voltage: voltage,
                ..valid_request()
            };
            assert!(request.validate().is_err(), "voltage {} should fail", voltage);
        }
    }

    #[test]
    fn test_service_life_non_negative() {
        let request = CreateBatteryRequest {
            service_life: 0,
            ..valid_request()
        };
        assert!(request.validate().is_ok());

        let request = CreateBatteryRequest {
            service_life: -1,
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_partial_update_skips_absent_fields() {
        let request = UpdateBatteryRequest {
            residual_capacity: Some(80.0),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let request = UpdateBatteryRequest {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
