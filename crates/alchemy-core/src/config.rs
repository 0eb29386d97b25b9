use crate::fixed::{Fixed64, Millis, f64_to_fixed64_saturating};
use crate::liquid::PORTIONS_PER_LITRE;
use serde::{Deserialize, Serialize};

/// Tunables for the alchemy system. Every field has a default, so a config
/// file only needs to name what it changes.
///
/// Floating-point fields are human-facing; the runtime reads them through the
/// fixed-point accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlchemyConfig {
    /// Degrees Celsius a vessel must exceed before anything fuses.
    pub ignition_threshold: f64,
    /// Continuous match time before a recipe commits.
    pub hold_duration_ms: Millis,
    /// Throttle for presentation-side effects.
    pub presentation_interval_ms: Millis,
    /// Throttle for the authoritative gameplay path.
    pub gameplay_interval_ms: Millis,
    /// Horizontal reach (blocks) when scanning for thrown ingredients.
    pub absorb_radius_horizontal: f64,
    /// Vertical reach (blocks) when scanning for thrown ingredients.
    pub absorb_radius_vertical: f64,
    /// Portions moved by one pour or draw.
    pub transfer_unit: u32,
    /// Positions without a heat notification for this long are forgotten.
    pub session_idle_timeout_ms: Millis,
    /// Ring-buffer capacity per event kind.
    pub event_buffer_capacity: usize,
}

impl Default for AlchemyConfig {
    fn default() -> Self {
        Self {
            ignition_threshold: 200.0,
            hold_duration_ms: 10_000,
            presentation_interval_ms: 100,
            gameplay_interval_ms: 2_000,
            absorb_radius_horizontal: 1.5,
            absorb_radius_vertical: 1.0,
            transfer_unit: PORTIONS_PER_LITRE,
            session_idle_timeout_ms: 30_000,
            event_buffer_capacity: 256,
        }
    }
}

/// A config value the runtime cannot represent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} = {value} is not a finite fixed-point value")]
    NotRepresentable { field: &'static str, value: f64 },
    #[error("{field} = {value} must not be negative")]
    Negative { field: &'static str, value: f64 },
}

impl ConfigError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::NotRepresentable { field, .. } | ConfigError::Negative { field, .. } => *field,
        }
    }
}

impl AlchemyConfig {
    /// Check that every floating-point field fits `Fixed64`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fixed("ignition_threshold", self.ignition_threshold)?;
        for (field, value) in [
            ("absorb_radius_horizontal", self.absorb_radius_horizontal),
            ("absorb_radius_vertical", self.absorb_radius_vertical),
        ] {
            check_fixed(field, value)?;
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Saturates if the config was never validated.
    pub fn ignition_threshold(&self) -> Fixed64 {
        f64_to_fixed64_saturating(self.ignition_threshold)
    }

    /// `(horizontal, vertical)` scan radius.
    pub fn absorb_radius(&self) -> (Fixed64, Fixed64) {
        (
            f64_to_fixed64_saturating(self.absorb_radius_horizontal),
            f64_to_fixed64_saturating(self.absorb_radius_vertical),
        )
    }
}

fn check_fixed(field: &'static str, value: f64) -> Result<(), ConfigError> {
    match Fixed64::checked_from_num(value) {
        Some(_) if value.is_finite() => Ok(()),
        _ => Err(ConfigError::NotRepresentable { field, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AlchemyConfig::default();
        assert_eq!(cfg.hold_duration_ms, 10_000);
        assert_eq!(cfg.transfer_unit, 100);
        assert_eq!(cfg.ignition_threshold(), Fixed64::from_num(200));
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AlchemyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn unrepresentable_values_are_rejected() {
        let cfg = AlchemyConfig {
            ignition_threshold: 1e10,
            ..AlchemyConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotRepresentable {
                field: "ignition_threshold",
                value: 1e10
            })
        );

        let cfg = AlchemyConfig {
            absorb_radius_vertical: f64::NAN,
            ..AlchemyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotRepresentable {
                field: "absorb_radius_vertical",
                ..
            })
        ));

        let cfg = AlchemyConfig {
            absorb_radius_horizontal: -1.0,
            ..AlchemyConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn accessors_saturate_instead_of_panicking() {
        let cfg = AlchemyConfig {
            ignition_threshold: 1e10,
            absorb_radius_horizontal: f64::NAN,
            ..AlchemyConfig::default()
        };
        assert_eq!(cfg.ignition_threshold(), Fixed64::MAX);
        assert_eq!(cfg.absorb_radius().0, Fixed64::ZERO);
    }

    #[test]
    fn absorb_radius_accessor() {
        let (h, v) = AlchemyConfig::default().absorb_radius();
        assert_eq!(h, Fixed64::from_num(1.5));
        assert_eq!(v, Fixed64::ONE);
    }
}
