//! Fleet-wide aggregate statistics.
//!
//! Computed fresh over the full battery snapshot on every call; nothing is
//! cached between requests.

use serde::Serialize;

use crate::alerts::{self, AlertThresholds};
use crate::models::Battery;

/// Aggregate metrics over all batteries.
///
/// The dashboard renders every key generically, so the field names are part of
/// the API contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total_batteries: usize,
    /// Mean residual capacity, rounded to two decimals. Omitted for an empty
    /// fleet rather than reported as zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_capacity: Option<f64>,
    pub low_capacity_count: usize,
    pub need_replacement_count: usize,
}

/// Summarize the current battery snapshot.
pub fn summarize(batteries: &[Battery], thresholds: &AlertThresholds) -> FleetSummary {
    let total = batteries.len();

    let average_capacity = if total == 0 {
        None
    } else {
        let sum: f64 = batteries.iter().map(|b| b.residual_capacity).sum();
        Some(round2(sum / total as f64))
    };

    let low_capacity_count = batteries
        .iter()
        .filter(|b| alerts::is_low_capacity(b, thresholds))
        .count();
    let need_replacement_count = batteries
        .iter()
        .filter(|b| alerts::needs_replacement(b, thresholds))
        .count();

    FleetSummary {
        total_batteries: total,
        average_capacity,
        low_capacity_count,
        need_replacement_count,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_battery(id: &str, residual_capacity: f64, service_life: i64) -> Battery {
        Battery {
            id: id.to_string(),
            device_id: "d1".to_string(),
            name: format!("Battery_{}", id),
            nominal_voltage: 12.0,
            residual_capacity,
            service_life,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_empty_fleet_omits_average() {
        let summary = summarize(&[], &AlertThresholds::default());

        assert_eq!(summary.total_batteries, 0);
        assert_eq!(summary.average_capacity, None);
        assert_eq!(summary.low_capacity_count, 0);
        assert_eq!(summary.need_replacement_count, 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("average_capacity").is_none());
    }

    #[test]
    fn test_counts_and_mean() {
        let thresholds = AlertThresholds::default();
        let batteries = vec![
            test_battery("1", 80.0, 100),
            test_battery("2", 15.0, 400),
            test_battery("3", 5.0, 400),
        ];

        let summary = summarize(&batteries, &thresholds);

        assert_eq!(summary.total_batteries, 3);
        assert_eq!(summary.average_capacity, Some(33.33));
        assert_eq!(summary.low_capacity_count, 2);
        // Batteries 2 and 3 are over the service-life limit; 3 is also critical.
        assert_eq!(summary.need_replacement_count, 2);
    }

    #[test]
    fn test_single_battery_fleet() {
        let thresholds = AlertThresholds {
            low_capacity: 30.0,
            ..AlertThresholds::default()
        };
        let batteries = vec![test_battery("1", 15.0, 400)];

        let summary = summarize(&batteries, &thresholds);

        assert_eq!(summary.total_batteries, 1);
        assert_eq!(summary.average_capacity, Some(15.0));
        assert_eq!(summary.low_capacity_count, 1);
        assert_eq!(summary.need_replacement_count, 1);
    }
}
