//! Alert classification for batteries.
//!
//! Classification is a pure function of a battery's current attributes and the
//! configured thresholds. Nothing here is persisted; alert queries always
//! recompute over the store's current state.

use serde::Serialize;

use crate::models::Battery;

/// A derived, non-persisted alert classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertCategory {
    /// Residual capacity below the low-capacity threshold.
    LowCapacity,
    /// Battery should be swapped out: service life over the limit or capacity
    /// at/below the critical threshold.
    NeedsReplacement,
}

/// Interpretation of the `service_life` field.
///
/// The wire format does not say whether the value counts days already served
/// or days left, so the direction of the replacement comparison is
/// configuration rather than code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifeSemantics {
    /// `service_life` counts elapsed days; replace once it reaches the limit.
    Elapsed,
    /// `service_life` counts remaining days; replace once it drops below the limit.
    Remaining,
}

impl ServiceLifeSemantics {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceLifeSemantics::Elapsed => "elapsed",
            ServiceLifeSemantics::Remaining => "remaining",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "elapsed" => Some(ServiceLifeSemantics::Elapsed),
            "remaining" => Some(ServiceLifeSemantics::Remaining),
            _ => None,
        }
    }
}

/// Operator-tunable alert thresholds.
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    /// Percent below which a battery counts as low-capacity.
    pub low_capacity: f64,
    /// Percent at or below which a battery needs replacement. Stricter than
    /// `low_capacity`.
    pub critical_capacity: f64,
    /// Service-life limit in days; compared per `service_life_semantics`.
    pub service_life_limit: i64,
    pub service_life_semantics: ServiceLifeSemantics,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_capacity: 20.0,
            critical_capacity: 10.0,
            service_life_limit: 365,
            service_life_semantics: ServiceLifeSemantics::Elapsed,
        }
    }
}

/// Whether the battery's residual capacity is below the low threshold.
pub fn is_low_capacity(battery: &Battery, thresholds: &AlertThresholds) -> bool {
    battery.residual_capacity < thresholds.low_capacity
}

/// Whether the battery should be replaced.
pub fn needs_replacement(battery: &Battery, thresholds: &AlertThresholds) -> bool {
    let life_exceeded = match thresholds.service_life_semantics {
        ServiceLifeSemantics::Elapsed => battery.service_life >= thresholds.service_life_limit,
        ServiceLifeSemantics::Remaining => battery.service_life < thresholds.service_life_limit,
    };

    life_exceeded || battery.residual_capacity <= thresholds.critical_capacity
}

/// Classify a battery into zero or more alert categories.
///
/// Categories are independent and non-exclusive; a battery may be in both.
pub fn classify(battery: &Battery, thresholds: &AlertThresholds) -> Vec<AlertCategory> {
    let mut categories = Vec::new();
    if is_low_capacity(battery, thresholds) {
        categories.push(AlertCategory::LowCapacity);
    }
    if needs_replacement(battery, thresholds) {
        categories.push(AlertCategory::NeedsReplacement);
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_battery(residual_capacity: f64, service_life: i64) -> Battery {
        Battery {
            id: "b1".to_string(),
            device_id: "d1".to_string(),
            name: "Battery_001".to_string(),
            nominal_voltage: 12.0,
            residual_capacity,
            service_life,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_low_capacity_threshold_is_exclusive() {
        let thresholds = AlertThresholds::default();

        assert!(is_low_capacity(&test_battery(19.9, 0), &thresholds));
        assert!(!is_low_capacity(&test_battery(20.0, 0), &thresholds));
    }

    #[test]
    fn test_critical_capacity_threshold_is_inclusive() {
        let thresholds = AlertThresholds::default();

        assert!(needs_replacement(&test_battery(10.0, 0), &thresholds));
        assert!(!needs_replacement(&test_battery(10.1, 0), &thresholds));
    }

    #[test]
    fn test_elapsed_service_life_direction() {
        let thresholds = AlertThresholds::default();

        assert!(needs_replacement(&test_battery(50.0, 365), &thresholds));
        assert!(needs_replacement(&test_battery(50.0, 400), &thresholds));
        assert!(!needs_replacement(&test_battery(50.0, 364), &thresholds));
    }

    #[test]
    fn test_remaining_service_life_direction() {
        let thresholds = AlertThresholds {
            service_life_limit: 30,
            service_life_semantics: ServiceLifeSemantics::Remaining,
            ..AlertThresholds::default()
        };

        assert!(needs_replacement(&test_battery(50.0, 29), &thresholds));
        assert!(!needs_replacement(&test_battery(50.0, 30), &thresholds));
    }

    #[test]
    fn test_categories_are_independent() {
        let thresholds = AlertThresholds {
            low_capacity: 30.0,
            ..AlertThresholds::default()
        };

        // Low capacity and over the service-life limit: both categories.
        let both = test_battery(15.0, 400);
        assert_eq!(
            classify(&both, &thresholds),
            vec![AlertCategory::LowCapacity, AlertCategory::NeedsReplacement]
        );

        // Low but not critical, and young: only low-capacity.
        let low_only = test_battery(15.0, 10);
        assert_eq!(classify(&low_only, &thresholds), vec![AlertCategory::LowCapacity]);

        // Healthy capacity but old: only replacement.
        let old_only = test_battery(80.0, 400);
        assert_eq!(
            classify(&old_only, &thresholds),
            vec![AlertCategory::NeedsReplacement]
        );

        assert!(classify(&test_battery(80.0, 10), &thresholds).is_empty());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let thresholds = AlertThresholds::default();
        let battery = test_battery(5.0, 400);

        assert_eq!(
            classify(&battery, &thresholds),
            classify(&battery, &thresholds)
        );
    }
}
