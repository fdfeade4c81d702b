//! Government mandates with threshold/floor hysteresis.
//!
//! Each mandate is switched once per day from day-end statistics:
//!
//! ```text
//! threshold_hit(x) = infected > x || dead / 2 > x
//! floor_hit(x)     = infected < x && !threshold_hit(x)
//! next(old)        = (!floor_hit && (old || threshold_hit)) || (floor_hit && old && threshold_hit)
//! ```
//!
//! `threshold_hit` and `floor_hit` are evaluated against the mandate's threshold and floor
//! respectively. Mandates never touch agents directly; they change how the daily decisions
//! are taken.
use std::fmt::{self, Display};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MandateConfig {
    /// Fraction of infected (or half the dead fraction) above which the mandate turns on.
    pub threshold: f64,
    /// Fraction of infected below which the mandate may turn off.
    pub floor: f64,
    /// Target coverage; compliance is only sought while coverage is below it.
    pub amount: f64,
    /// Probability that a person ignores the mandate.
    pub fail: f64,
}

impl Default for MandateConfig {
    fn default() -> Self {
        MandateConfig {
            threshold: 0.1,
            floor: 0.1,
            amount: 0.1,
            fail: 0.1,
        }
    }
}

impl MandateConfig {
    fn validate(&self, mandate: &str) -> Result<(), SimError> {
        for (name, value) in [
            ("threshold", self.threshold),
            ("floor", self.floor),
            ("amount", self.amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid_config(format!(
                    "government.{mandate}.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.fail) {
            return Err(SimError::invalid_config(format!(
                "government.{mandate}.fail must be in [0, 1], got {}",
                self.fail
            )));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct GovernmentConfig {
    pub vaccinate: MandateConfig,
    pub mask: MandateConfig,
    pub isolate: MandateConfig,
    /// Probability that a sick person ignores an isolation mandate.
    pub sick_isolate_fail: f64,
}

impl Default for GovernmentConfig {
    fn default() -> Self {
        GovernmentConfig {
            vaccinate: MandateConfig::default(),
            mask: MandateConfig::default(),
            isolate: MandateConfig::default(),
            sick_isolate_fail: 0.1,
        }
    }
}

impl GovernmentConfig {
    /// # Errors
    /// Returns `SimError::InvalidConfig` for negative thresholds, floors or amounts and for
    /// failure rates outside [0, 1].
    pub fn validate(&self) -> Result<(), SimError> {
        self.vaccinate.validate("vaccinate")?;
        self.mask.validate("mask")?;
        self.isolate.validate("isolate")?;
        if !(0.0..=1.0).contains(&self.sick_isolate_fail) {
            return Err(SimError::invalid_config(format!(
                "government.sick_isolate_fail must be in [0, 1], got {}",
                self.sick_isolate_fail
            )));
        }
        Ok(())
    }
}

#[must_use]
pub fn threshold_hit(infected_fraction: f64, dead_fraction: f64, threshold: f64) -> bool {
    infected_fraction > threshold || dead_fraction / 2.0 > threshold
}

#[must_use]
pub fn floor_hit(infected_fraction: f64, dead_fraction: f64, floor: f64) -> bool {
    infected_fraction < floor && !threshold_hit(infected_fraction, dead_fraction, floor)
}

#[must_use]
pub fn next_mandate_state(current: bool, threshold_hit: bool, floor_hit: bool) -> bool {
    (!floor_hit && (current || threshold_hit)) || (floor_hit && (current && threshold_hit))
}

#[derive(Debug, Clone)]
pub struct Government {
    config: GovernmentConfig,
    vaccine_mandate: bool,
    mask_mandate: bool,
    isolate_mandate: bool,
}

impl Government {
    /// A government with every mandate off.
    ///
    /// # Errors
    /// Returns `SimError::InvalidConfig` if `config` fails validation.
    pub fn new(config: GovernmentConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Government {
            config,
            vaccine_mandate: false,
            mask_mandate: false,
            isolate_mandate: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GovernmentConfig {
        &self.config
    }

    #[must_use]
    pub fn vaccine_mandate(&self) -> bool {
        self.vaccine_mandate
    }

    #[must_use]
    pub fn mask_mandate(&self) -> bool {
        self.mask_mandate
    }

    #[must_use]
    pub fn isolate_mandate(&self) -> bool {
        self.isolate_mandate
    }

    /// Forces mandate states, e.g. to start a run with a mandate already in force.
    pub fn set_mandates(&mut self, vaccine: bool, mask: bool, isolate: bool) {
        self.vaccine_mandate = vaccine;
        self.mask_mandate = mask;
        self.isolate_mandate = isolate;
    }

    /// Recomputes all three mandates from day-end statistics.
    pub fn update(&mut self, infected_fraction: f64, dead_fraction: f64) {
        let step = |name: &str, current: bool, mandate: &MandateConfig| {
            let next = next_mandate_state(
                current,
                threshold_hit(infected_fraction, dead_fraction, mandate.threshold),
                floor_hit(infected_fraction, dead_fraction, mandate.floor),
            );
            if next != current {
                info!(
                    "{name} mandate {} (infected={infected_fraction:.3}, dead={dead_fraction:.3})",
                    if next { "enacted" } else { "lifted" }
                );
            }
            next
        };
        self.vaccine_mandate = step("vaccine", self.vaccine_mandate, &self.config.vaccinate);
        self.mask_mandate = step("mask", self.mask_mandate, &self.config.mask);
        self.isolate_mandate = step("isolate", self.isolate_mandate, &self.config.isolate);
    }
}

impl Display for Government {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |on: bool| if on { "in force" } else { "off" };
        writeln!(f, "Vaccine mandate: {}", state(self.vaccine_mandate))?;
        writeln!(f, "Mask mandate: {}", state(self.mask_mandate))?;
        writeln!(f, "Isolation mandate: {}", state(self.isolate_mandate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mandate(threshold: f64, floor: f64) -> MandateConfig {
        MandateConfig {
            threshold,
            floor,
            ..MandateConfig::default()
        }
    }

    #[test]
    fn transition_table() {
        // (current, threshold_hit, floor_hit) -> next
        let cases = [
            (false, false, false, false),
            (false, true, false, true),
            (true, false, false, true),
            (true, true, false, true),
            (false, false, true, false),
            (true, false, true, false),
        ];
        for (current, t, f, expected) in cases {
            assert_eq!(next_mandate_state(current, t, f), expected, "{current} {t} {f}");
        }
    }

    #[test]
    fn threshold_counts_half_the_dead() {
        assert!(threshold_hit(0.0, 0.3, 0.1));
        assert!(!threshold_hit(0.0, 0.2, 0.1));
        assert!(threshold_hit(0.11, 0.0, 0.1));
        assert!(!floor_hit(0.01, 0.3, 0.1));
        assert!(floor_hit(0.01, 0.0, 0.1));
    }

    #[test]
    fn hysteresis_between_floor_and_threshold() {
        let config = GovernmentConfig {
            mask: mandate(0.2, 0.05),
            ..GovernmentConfig::default()
        };
        let mut government = Government::new(config).unwrap();

        government.update(0.1, 0.0);
        assert!(!government.mask_mandate());
        government.update(0.25, 0.0);
        assert!(government.mask_mandate());
        // Between floor and threshold the mandate stays on.
        government.update(0.1, 0.0);
        assert!(government.mask_mandate());
        government.update(0.01, 0.0);
        assert!(!government.mask_mandate());
        // and stays off until the threshold is crossed again.
        government.update(0.1, 0.0);
        assert!(!government.mask_mandate());
    }

    #[test]
    fn mandates_are_independent() {
        let config = GovernmentConfig {
            vaccinate: mandate(0.5, 0.1),
            mask: mandate(0.05, 0.01),
            isolate: mandate(0.2, 0.1),
            sick_isolate_fail: 0.0,
        };
        let mut government = Government::new(config).unwrap();
        government.update(0.3, 0.0);
        assert!(!government.vaccine_mandate());
        assert!(government.mask_mandate());
        assert!(government.isolate_mandate());
    }

    #[test]
    fn rejects_bad_fail_rate() {
        let config = GovernmentConfig {
            sick_isolate_fail: 1.5,
            ..GovernmentConfig::default()
        };
        assert!(matches!(Government::new(config), Err(SimError::InvalidConfig(_))));
    }
}
