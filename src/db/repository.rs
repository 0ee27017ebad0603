//! Database repository for CRUD operations.
//!
//! The repository is the entity store: it owns referential integrity between
//! devices and batteries, field validation at write time, and the cascade
//! delete invariant. Every mutation is immediately visible to subsequent
//! reads; derived views (alerts, stats) are computed elsewhere from the
//! snapshots this module returns.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Battery, CreateBatteryRequest, CreateDeviceRequest, Device, UpdateBatteryRequest,
    UpdateDeviceRequest,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
    max_batteries_per_device: usize,
}

impl Repository {
    pub fn new(pool: SqlitePool, max_batteries_per_device: usize) -> Self {
        Self {
            pool,
            max_batteries_per_device,
        }
    }

    // ==================== DEVICE OPERATIONS ====================

    /// List all devices in creation order, each with its batteries nested in
    /// insertion order.
    pub async fn list_devices(&self) -> Result<Vec<Device>, AppError> {
        // rowid preserves insertion order
        let rows = sqlx::query(
            "SELECT id, name, firmware_version, is_active, created_at, updated_at FROM devices ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut batteries_by_device: HashMap<String, Vec<Battery>> = HashMap::new();
        for battery in self.list_batteries().await? {
            batteries_by_device
                .entry(battery.device_id.clone())
                .or_default()
                .push(battery);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut device = device_from_row(&row);
                device.batteries = batteries_by_device.remove(&device.id).unwrap_or_default();
                device
            })
            .collect())
    }

    /// Get a device by ID, with its batteries nested.
    pub async fn get_device(&self, id: &str) -> Result<Option<Device>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, firmware_version, is_active, created_at, updated_at FROM devices WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut device = device_from_row(&row);
                device.batteries = self.batteries_for_device_unchecked(id).await?;
                Ok(Some(device))
            }
            None => Ok(None),
        }
    }

    /// Create a new device.
    pub async fn create_device(&self, request: &CreateDeviceRequest) -> Result<Device, AppError> {
        request.validate()?;
        self.ensure_device_name_free(&request.name, None).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO devices (id, name, firmware_version, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.firmware_version)
        .bind(request.is_active as i32)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Device {
            id,
            name: request.name.clone(),
            firmware_version: request.firmware_version.clone(),
            is_active: request.is_active,
            batteries: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Partially update a device. Absent fields are left untouched.
    pub async fn update_device(
        &self,
        id: &str,
        request: &UpdateDeviceRequest,
    ) -> Result<Device, AppError> {
        request.validate()?;

        let existing = self
            .get_device(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", id)))?;

        let name = request.name.clone().unwrap_or_else(|| existing.name.clone());
        if name != existing.name {
            self.ensure_device_name_free(&name, Some(id)).await?;
        }
        let firmware_version = request
            .firmware_version
            .clone()
            .unwrap_or_else(|| existing.firmware_version.clone());
        let is_active = request.is_active.unwrap_or(existing.is_active);

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE devices SET name = ?, firmware_version = ?, is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(&firmware_version)
        .bind(is_active as i32)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Device {
            id: id.to_string(),
            name,
            firmware_version,
            is_active,
            batteries: existing.batteries,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a device and all of its batteries.
    ///
    /// Runs in one transaction so no reader ever observes a partially-deleted
    /// battery set.
    pub async fn delete_device(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM batteries WHERE device_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Device {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    // ==================== BATTERY OPERATIONS ====================

    /// List all batteries in creation order.
    pub async fn list_batteries(&self) -> Result<Vec<Battery>, AppError> {
        let rows = sqlx::query(
            "SELECT id, device_id, name, nominal_voltage, residual_capacity, service_life, created_at, updated_at FROM batteries ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| battery_from_row(&row)).collect())
    }

    /// List the batteries attached to a device.
    pub async fn batteries_for_device(&self, device_id: &str) -> Result<Vec<Battery>, AppError> {
        if !self.device_exists(device_id).await? {
            return Err(AppError::NotFound(format!(
                "Device {} not found",
                device_id
            )));
        }
        self.batteries_for_device_unchecked(device_id).await
    }

    /// Get a battery by ID.
    pub async fn get_battery(&self, id: &str) -> Result<Option<Battery>, AppError> {
        let row = sqlx::query(
            "SELECT id, device_id, name, nominal_voltage, residual_capacity, service_life, created_at, updated_at FROM batteries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(battery_from_row))
    }

    /// Create a new battery under an existing device.
    pub async fn create_battery(
        &self,
        device_id: &str,
        request: &CreateBatteryRequest,
    ) -> Result<Battery, AppError> {
        if !self.device_exists(device_id).await? {
            return Err(AppError::NotFound(format!(
                "Device {} not found",
                device_id
            )));
        }

        request.validate()?;
        self.ensure_battery_capacity_left(device_id).await?;
        self.ensure_battery_name_free(&request.name, None).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO batteries (id, device_id, name, nominal_voltage, residual_capacity, service_life, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(device_id)
        .bind(&request.name)
        .bind(request.nominal_voltage)
        .bind(request.residual_capacity)
        .bind(request.service_life)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Battery {
            id,
            device_id: device_id.to_string(),
            name: request.name.clone(),
            nominal_voltage: request.nominal_voltage,
            residual_capacity: request.residual_capacity,
            service_life: request.service_life,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Partially update a battery. Absent fields are left untouched.
    pub async fn update_battery(
        &self,
        id: &str,
        request: &UpdateBatteryRequest,
    ) -> Result<Battery, AppError> {
        request.validate()?;

        let existing = self
            .get_battery(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Battery {} not found", id)))?;

        let name = request.name.clone().unwrap_or_else(|| existing.name.clone());
        if name != existing.name {
            self.ensure_battery_name_free(&name, Some(id)).await?;
        }
        let nominal_voltage = request.nominal_voltage.unwrap_or(existing.nominal_voltage);
        let residual_capacity = request
            .residual_capacity
            .unwrap_or(existing.residual_capacity);
        let service_life = request.service_life.unwrap_or(existing.service_life);

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE batteries SET name = ?, nominal_voltage = ?, residual_capacity = ?, service_life = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(nominal_voltage)
        .bind(residual_capacity)
        .bind(service_life)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Battery {
            id: id.to_string(),
            device_id: existing.device_id,
            name,
            nominal_voltage,
            residual_capacity,
            service_life,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a battery that belongs to the given device.
    pub async fn delete_battery(&self, device_id: &str, id: &str) -> Result<(), AppError> {
        let battery = self.get_battery(id).await?;

        match battery {
            Some(battery) if battery.device_id == device_id => {
                sqlx::query("DELETE FROM batteries WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }
            _ => Err(AppError::NotFound(
                "Battery not found or not associated with this device".to_string(),
            )),
        }
    }

    /// Delete a battery by ID alone.
    pub async fn delete_battery_by_id(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM batteries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Battery {} not found", id)));
        }
        Ok(())
    }

    /// Move a battery to another device.
    pub async fn reassign_battery(
        &self,
        id: &str,
        new_device_id: &str,
    ) -> Result<Battery, AppError> {
        let battery = self
            .get_battery(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Battery {} not found", id)))?;

        if !self.device_exists(new_device_id).await? {
            return Err(AppError::NotFound(format!(
                "Device {} not found",
                new_device_id
            )));
        }

        if battery.device_id == new_device_id {
            return Ok(battery);
        }

        self.ensure_battery_capacity_left(new_device_id).await?;

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE batteries SET device_id = ?, updated_at = ? WHERE id = ?")
            .bind(new_device_id)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Battery {
            device_id: new_device_id.to_string(),
            updated_at: now,
            ..battery
        })
    }

    /// Count the batteries attached to a device.
    pub async fn count_batteries_for_device(&self, device_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM batteries WHERE device_id = ?")
            .bind(device_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    // ==================== INTERNAL HELPERS ====================

    async fn batteries_for_device_unchecked(
        &self,
        device_id: &str,
    ) -> Result<Vec<Battery>, AppError> {
        let rows = sqlx::query(
            "SELECT id, device_id, name, nominal_voltage, residual_capacity, service_life, created_at, updated_at FROM batteries WHERE device_id = ? ORDER BY rowid",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| battery_from_row(&row)).collect())
    }

    async fn device_exists(&self, id: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM devices WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Device names are unique across the fleet. `exclude_id` skips the record
    /// being updated so renaming to the current name is a no-op.
    async fn ensure_device_name_free(
        &self,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<(), AppError> {
        let row = sqlx::query("SELECT id FROM devices WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            let found_id: String = row.get("id");
            if exclude_id != Some(found_id.as_str()) {
                return Err(AppError::Conflict(
                    "Device with this name already exists".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Battery names are unique across the fleet.
    async fn ensure_battery_name_free(
        &self,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<(), AppError> {
        let row = sqlx::query("SELECT id FROM batteries WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            let found_id: String = row.get("id");
            if exclude_id != Some(found_id.as_str()) {
                return Err(AppError::Conflict(
                    "Battery with this name already exists".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn ensure_battery_capacity_left(&self, device_id: &str) -> Result<(), AppError> {
        let count = self.count_batteries_for_device(device_id).await?;
        if count >= self.max_batteries_per_device as i64 {
            return Err(AppError::Validation(format!(
                "Device cannot have more than {} batteries",
                self.max_batteries_per_device
            )));
        }
        Ok(())
    }
}

fn device_from_row(row: &SqliteRow) -> Device {
    Device {
        id: row.get("id"),
        name: row.get("name"),
        firmware_version: row.get("firmware_version"),
        is_active: row.get::<i32, _>("is_active") != 0,
        batteries: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn battery_from_row(row: &SqliteRow) -> Battery {
    Battery {
        id: row.get("id"),
        device_id: row.get("device_id"),
        name: row.get("name"),
        nominal_voltage: row.get("nominal_voltage"),
        residual_capacity: row.get("residual_capacity"),
        service_life: row.get("service_life"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
