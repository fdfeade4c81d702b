//! Epidemiological parameters of a pathogen.
//!
//! A [`VirusProfile`] is built once from a [`VirusConfig`] and is read-only for the rest of
//! the run. It holds the base per-day recovery and death odds, the incubation and vaccine
//! activation delays, the parallel transmission channels, and four groups of multiplicative
//! [`Modifiers`] that apply to asymptomatic, immunocompromised, vaccinated and previously
//! recovered people.
use std::fmt::{self, Display};
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::person::Person;

/// Multiplicative factors applied to a person's odds.
///
/// * `infection` scales an infectious person's odds of passing the virus on,
/// * `contraction` scales a susceptible person's odds of acquiring it,
/// * `recovery` and `death` scale a sick person's daily recovery and death odds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Modifiers {
    pub infection: f64,
    pub contraction: f64,
    pub recovery: f64,
    pub death: f64,
}

impl Modifiers {
    /// Modifiers that leave every odds unchanged.
    pub const NEUTRAL: Modifiers = Modifiers::new(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(infection: f64, contraction: f64, recovery: f64, death: f64) -> Self {
        Modifiers {
            infection,
            contraction,
            recovery,
            death,
        }
    }

    fn validate(&self, group: &str) -> Result<(), SimError> {
        for (name, value) in [
            ("infection", self.infection),
            ("contraction", self.contraction),
            ("recovery", self.recovery),
            ("death", self.death),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid_config(format!(
                    "{group}.{name} modifier must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::NEUTRAL
    }
}

/// When a vaccine can be administered. `day` is the zero-based simulation day.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VaccineSchedule {
    #[default]
    Never,
    Always,
    /// Available on `day` and every day after it.
    FromDay(u32),
    /// Available on days in `start..end`.
    Window { start: u32, end: u32 },
}

impl VaccineSchedule {
    #[must_use]
    pub fn is_available(&self, day: u32) -> bool {
        match *self {
            VaccineSchedule::Never => false,
            VaccineSchedule::Always => true,
            VaccineSchedule::FromDay(first) => day >= first,
            VaccineSchedule::Window { start, end } => (start..end).contains(&day),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct VirusConfig {
    pub name: String,
    pub recovery_odds: f64,
    pub death_odds: f64,
    pub incubation_period: u32,
    pub vaccine_activation_delay: u32,
    pub infectiousness: Vec<f64>,
    pub contraction: Vec<f64>,
    pub mask_effectiveness: Vec<f64>,
    pub asymptomatic: Modifiers,
    pub immunocompromised: Modifiers,
    pub vaccinated: Modifiers,
    pub recovered: Modifiers,
    pub vaccine_schedule: VaccineSchedule,
}

impl Default for VirusConfig {
    fn default() -> Self {
        VirusConfig {
            name: "default_virus".to_string(),
            recovery_odds: 0.1,
            death_odds: 0.01,
            incubation_period: 5,
            vaccine_activation_delay: 10,
            infectiousness: vec![0.5],
            contraction: vec![0.5],
            mask_effectiveness: vec![0.5],
            asymptomatic: Modifiers::new(0.75, 1.0, 2.0, 0.1),
            immunocompromised: Modifiers::new(1.5, 1.0, 0.2, 5.0),
            vaccinated: Modifiers::new(0.6, 0.5, 5.0, 0.1),
            recovered: Modifiers::new(1.0, 1.0, 1.5, 0.75),
            vaccine_schedule: VaccineSchedule::Never,
        }
    }
}

impl VirusConfig {
    /// # Errors
    /// Returns `SimError::InvalidConfig` for odds outside [0, 1], a zero vaccine activation
    /// delay, negative modifiers and unusable transmission channels.
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("recovery_odds", self.recovery_odds),
            ("death_odds", self.death_odds),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::invalid_config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.vaccine_activation_delay == 0 {
            return Err(SimError::invalid_config(
                "vaccine_activation_delay must be at least 1 day",
            ));
        }
        self.asymptomatic.validate("asymptomatic")?;
        self.immunocompromised.validate("immunocompromised")?;
        self.vaccinated.validate("vaccinated")?;
        self.recovered.validate("recovered")?;
        TransmissionChannels::from_sequences(
            &self.infectiousness,
            &self.contraction,
            &self.mask_effectiveness,
        )?;
        Ok(())
    }
}

/// One contact mode (droplet, touch, ...).
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TransmissionChannel {
    pub infectiousness: f64,
    pub contraction: f64,
    pub mask_effectiveness: f64,
}

impl TransmissionChannel {
    /// Odds of transmission over this channel before any modifier is applied.
    #[must_use]
    pub fn base_odds(&self) -> f64 {
        self.infectiousness * self.contraction
    }
}

/// The non-empty list of channels a contact can use.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransmissionChannels(Vec<TransmissionChannel>);

impl TransmissionChannels {
    /// Zips the three per-channel sequences. If their lengths disagree, the channels
    /// collapse into a single channel holding the mean of each sequence.
    ///
    /// # Errors
    /// Returns `SimError::InvalidConfig` if a sequence is empty or holds a value outside
    /// [0, 1].
    pub fn from_sequences(
        infectiousness: &[f64],
        contraction: &[f64],
        mask_effectiveness: &[f64],
    ) -> Result<Self, SimError> {
        for (name, values) in [
            ("infectiousness", infectiousness),
            ("contraction", contraction),
            ("mask_effectiveness", mask_effectiveness),
        ] {
            if values.is_empty() {
                return Err(SimError::invalid_config(format!(
                    "{name} needs at least one channel"
                )));
            }
            if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(SimError::invalid_config(format!(
                    "{name} values must be in [0, 1], got {bad}"
                )));
            }
        }

        if infectiousness.len() == contraction.len()
            && contraction.len() == mask_effectiveness.len()
        {
            let channels = infectiousness
                .iter()
                .zip(contraction)
                .zip(mask_effectiveness)
                .map(|((&infectiousness, &contraction), &mask_effectiveness)| {
                    TransmissionChannel {
                        infectiousness,
                        contraction,
                        mask_effectiveness,
                    }
                })
                .collect();
            return Ok(TransmissionChannels(channels));
        }

        warn!(
            "transmission channel lengths disagree ({}, {}, {}); using one averaged channel",
            infectiousness.len(),
            contraction.len(),
            mask_effectiveness.len()
        );
        let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
        Ok(TransmissionChannels(vec![TransmissionChannel {
            infectiousness: mean(infectiousness),
            contraction: mean(contraction),
            mask_effectiveness: mean(mask_effectiveness),
        }]))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TransmissionChannel> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransmissionChannel> {
        self.0.iter()
    }
}

type VaccineAvailability = Arc<dyn Fn(u32) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct VirusProfile {
    name: String,
    base_recovery_odds: f64,
    base_death_odds: f64,
    incubation_period: u32,
    vaccine_activation_delay: u32,
    channels: TransmissionChannels,
    asymptomatic: Modifiers,
    immunocompromised: Modifiers,
    vaccinated: Modifiers,
    recovered: Modifiers,
    vaccine_available: VaccineAvailability,
}

impl VirusProfile {
    /// # Errors
    /// Returns `SimError::InvalidConfig` if `config` fails validation.
    pub fn new(config: &VirusConfig) -> Result<Self, SimError> {
        config.validate()?;
        let channels = TransmissionChannels::from_sequences(
            &config.infectiousness,
            &config.contraction,
            &config.mask_effectiveness,
        )?;
        let schedule = config.vaccine_schedule;
        Ok(VirusProfile {
            name: config.name.clone(),
            base_recovery_odds: config.recovery_odds,
            base_death_odds: config.death_odds,
            incubation_period: config.incubation_period,
            vaccine_activation_delay: config.vaccine_activation_delay,
            channels,
            asymptomatic: config.asymptomatic,
            immunocompromised: config.immunocompromised,
            vaccinated: config.vaccinated,
            recovered: config.recovered,
            vaccine_available: Arc::new(move |day| schedule.is_available(day)),
        })
    }

    /// Replaces the configured vaccine schedule with an arbitrary per-day gate.
    #[must_use]
    pub fn with_vaccine_availability(
        mut self,
        available: impl Fn(u32) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.vaccine_available = Arc::new(available);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn base_recovery_odds(&self) -> f64 {
        self.base_recovery_odds
    }

    #[must_use]
    pub fn base_death_odds(&self) -> f64 {
        self.base_death_odds
    }

    #[must_use]
    pub fn incubation_period(&self) -> u32 {
        self.incubation_period
    }

    #[must_use]
    pub fn vaccine_activation_delay(&self) -> u32 {
        self.vaccine_activation_delay
    }

    #[must_use]
    pub fn vaccine_available(&self, day: u32) -> bool {
        (self.vaccine_available)(day)
    }

    #[must_use]
    pub fn channels(&self) -> &TransmissionChannels {
        &self.channels
    }

    #[must_use]
    pub fn asymptomatic_modifiers(&self) -> &Modifiers {
        &self.asymptomatic
    }

    #[must_use]
    pub fn immunocompromised_modifiers(&self) -> &Modifiers {
        &self.immunocompromised
    }

    #[must_use]
    pub fn vaccinated_modifiers(&self) -> &Modifiers {
        &self.vaccinated
    }

    #[must_use]
    pub fn recovered_modifiers(&self) -> &Modifiers {
        &self.recovered
    }

    /// The modifier groups that apply to `person`, in a fixed order.
    fn applicable_modifiers<'a>(
        &'a self,
        person: &'a Person,
    ) -> impl Iterator<Item = &'a Modifiers> {
        [
            (person.is_asymptomatic(), &self.asymptomatic),
            (person.is_immunocompromised(), &self.immunocompromised),
            (person.is_vaccinated(), &self.vaccinated),
            (person.has_recovered(), &self.recovered),
        ]
        .into_iter()
        .filter_map(|(applies, modifiers)| applies.then_some(modifiers))
    }

    /// Daily recovery odds of a sick `person`. Not clamped; callers draw against it with a
    /// clamping Bernoulli trial.
    #[must_use]
    pub fn recovery_odds(&self, person: &Person) -> f64 {
        self.applicable_modifiers(person)
            .fold(self.base_recovery_odds, |odds, m| odds * m.recovery)
    }

    /// Daily death odds of a sick `person`. Not clamped.
    #[must_use]
    pub fn death_odds(&self, person: &Person) -> f64 {
        self.applicable_modifiers(person)
            .fold(self.base_death_odds, |odds, m| odds * m.death)
    }
}

impl fmt::Debug for VirusProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirusProfile")
            .field("name", &self.name)
            .field("base_recovery_odds", &self.base_recovery_odds)
            .field("base_death_odds", &self.base_death_odds)
            .field("incubation_period", &self.incubation_period)
            .field("vaccine_activation_delay", &self.vaccine_activation_delay)
            .field("channels", &self.channels)
            .field("asymptomatic", &self.asymptomatic)
            .field("immunocompromised", &self.immunocompromised)
            .field("vaccinated", &self.vaccinated)
            .field("recovered", &self.recovered)
            .finish_non_exhaustive()
    }
}

impl Display for VirusProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Virus: {}", self.name)?;
        writeln!(f, "Recovery odds per day: {:.2}%", self.base_recovery_odds * 100.0)?;
        writeln!(f, "Death odds per day: {:.2}%", self.base_death_odds * 100.0)?;
        writeln!(f, "Incubation period: {} days", self.incubation_period)?;
        writeln!(f, "Vaccine activation delay: {} days", self.vaccine_activation_delay)?;
        for (index, channel) in self.channels.iter().enumerate() {
            writeln!(
                f,
                "Channel {index}: infectiousness {:.2}, contraction {:.2}, mask {:.2}",
                channel.infectiousness,
                channel.contraction,
                channel.mask_effectiveness
            )?;
        }
        for (group, m) in [
            ("Immunocompromised", &self.immunocompromised),
            ("Vaccinated", &self.vaccinated),
            ("Recovered", &self.recovered),
            ("Asymptomatic", &self.asymptomatic),
        ] {
            writeln!(
                f,
                "{group} modifiers: infection x{}, contraction x{}, recovery x{}, death x{}",
                m.infection, m.contraction, m.recovery, m.death
            )?;
        }
        Ok(())
    }
}
