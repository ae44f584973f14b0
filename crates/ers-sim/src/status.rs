//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Display band classification for gauge consumers."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Severity band a reading falls into on a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Safe,
    Warning,
    Danger,
}

/// Warning/danger limits plus the displayed scale of one gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeBand {
    pub warning_above: f64,
    pub danger_above: f64,
    pub scale_min: f64,
    pub scale_max: f64,
}

pub const PRESSURE_BAND: GaugeBand = GaugeBand {
    warning_above: 110.0,
    danger_above: 125.0,
    scale_min: 80.0,
    scale_max: 150.0,
};

pub const TEMPERATURE_BAND: GaugeBand = GaugeBand {
    warning_above: 120.0,
    danger_above: 130.0,
    scale_min: 90.0,
    scale_max: 150.0,
};

impl GaugeBand {
    pub fn classify(&self, value: f64) -> StatusLevel {
        if value > self.danger_above {
            StatusLevel::Danger
        } else if value > self.warning_above {
            StatusLevel::Warning
        } else {
            StatusLevel::Safe
        }
    }

    /// Position of `value` on the gauge scale, clamped to `[0, 1]`.
    pub fn fill_fraction(&self, value: f64) -> f64 {
        let span = self.scale_max - self.scale_min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.scale_min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_exclusive() {
        assert_eq!(PRESSURE_BAND.classify(110.0), StatusLevel::Safe);
        assert_eq!(PRESSURE_BAND.classify(110.5), StatusLevel::Warning);
        assert_eq!(PRESSURE_BAND.classify(125.0), StatusLevel::Warning);
        assert_eq!(PRESSURE_BAND.classify(125.1), StatusLevel::Danger);
        assert_eq!(TEMPERATURE_BAND.classify(130.0), StatusLevel::Warning);
        assert_eq!(TEMPERATURE_BAND.classify(100.0), StatusLevel::Safe);
    }

    #[test]
    fn fill_fraction_clamps() {
        assert_eq!(PRESSURE_BAND.fill_fraction(60.0), 0.0);
        assert_eq!(PRESSURE_BAND.fill_fraction(200.0), 1.0);
        assert!((PRESSURE_BAND.fill_fraction(115.0) - 0.5).abs() < 1e-12);
        assert!((TEMPERATURE_BAND.fill_fraction(120.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(StatusLevel::Danger > StatusLevel::Warning);
        assert!(StatusLevel::Warning > StatusLevel::Safe);
    }
}
