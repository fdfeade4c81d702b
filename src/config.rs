//! Simulation configuration files.
//!
//! A configuration file is a JSON object with optional `virus`, `population` and
//! `government` sections. Missing keys take their defaults and unknown keys are rejected:
//!
//! ```json
//! {
//!     "virus": { "name": "flu", "incubation_period": 3 },
//!     "population": { "size": 1000, "initial_infected": 5 }
//! }
//! ```
use std::fs;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::government::GovernmentConfig;
use crate::population::PopulationConfig;
use crate::virus::VirusConfig;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    pub virus: VirusConfig,
    pub population: PopulationConfig,
    pub government: GovernmentConfig,
}

impl SimulationConfig {
    /// Parses and validates a configuration from a JSON string.
    ///
    /// # Errors
    /// Returns `SimError::JsonError` for malformed JSON or unknown keys and
    /// `SimError::InvalidConfig` for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `SimError::InvalidConfig` describing the first invalid value.
    pub fn validate(&self) -> Result<(), SimError> {
        self.virus.validate()?;
        self.population.validate()?;
        self.government.validate()
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
/// Returns `SimError::IoError` if the file cannot be read, and the errors of
/// [`SimulationConfig::from_json_str`] for its contents.
pub fn load_config(file_name: &Path) -> Result<SimulationConfig, SimError> {
    info!("loading simulation config from {}", file_name.display());
    let config_file = fs::File::open(file_name)?;
    let reader = BufReader::new(config_file);
    let config: SimulationConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::virus::VaccineSchedule;

    #[test]
    fn empty_object_gives_defaults() {
        let config = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn nested_sections() {
        let config = SimulationConfig::from_json_str(
            r#"{
                "virus": {"name": "flu", "vaccine_schedule": {"from_day": 10}},
                "population": {"size": 50, "initial_infected": 2, "mask": {"fail": 0.5}},
                "government": {"isolate": {"amount": 0.3}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.virus.name, "flu");
        assert_eq!(config.virus.vaccine_schedule, VaccineSchedule::FromDay(10));
        assert_eq!(config.population.size, 50);
        assert!((config.population.mask.fail - 0.5).abs() < f64::EPSILON);
        assert!((config.population.mask.threshold - 0.1).abs() < f64::EPSILON);
        assert!((config.government.isolate.amount - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = SimulationConfig::from_json_str(r#"{"population": {"pop_size": 10}}"#);
        assert!(matches!(result, Err(SimError::JsonError(_))));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let result =
            SimulationConfig::from_json_str(r#"{"population": {"connection_odds": 1.5}}"#);
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_config(&PathBuf::from("./does/not/exist.json"));
        assert!(matches!(result, Err(SimError::IoError(_))));
    }
}
