//! REST API module.
//!
//! Contains all API routes and handlers following the dashboard contract.

mod batteries;
mod devices;

pub use batteries::*;
pub use devices::*;

use serde::{Deserialize, Serialize};

/// Success envelope wrapping a single entity.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Success envelope for operations without a payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Maximum page size for list endpoints.
const MAX_PAGE_LIMIT: usize = 1000;

/// Pagination query parameters shared by list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of records to skip (default: 0).
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of records to return (default: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

impl ListQuery {
    pub fn clamped_limit(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }
}
