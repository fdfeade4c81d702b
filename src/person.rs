//! Per-agent health and behavior state.
//!
//! A [`Person`] is a small state machine:
//!
//! ```text
//! healthy/recovered --infect--> infected --sicken (countdown hits 0)--> sick
//! infected/sick --recover--> recovered
//! any live state --die--> dead
//! ```
//!
//! Dead people reject every further mutation with `SimError::DegenerateState`.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Infected people whose incubation countdown is below this value can already transmit.
pub const PRESYMPTOMATIC_WINDOW: u32 = 3;

/// Index of a person in the population arena and contact graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(usize);

impl PersonId {
    #[must_use]
    pub fn new(index: usize) -> Self {
        PersonId(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person {}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfectionStatus {
    #[default]
    Healthy,
    Infected,
    Sick,
    Recovered,
    Dead,
}

impl InfectionStatus {
    /// Healthy and recovered people can be (re)infected.
    #[must_use]
    pub fn is_susceptible(self) -> bool {
        matches!(self, InfectionStatus::Healthy | InfectionStatus::Recovered)
    }

    /// Infected or sick.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, InfectionStatus::Infected | InfectionStatus::Sick)
    }
}

impl Display for InfectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InfectionStatus::Healthy => "healthy",
            InfectionStatus::Infected => "infected",
            InfectionStatus::Sick => "sick",
            InfectionStatus::Recovered => "recovered",
            InfectionStatus::Dead => "dead",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Person {
    status: InfectionStatus,
    immunocompromised: bool,
    asymptomatic: bool,
    recovered: bool,
    vaccinated: bool,
    vaccine_countdown: u32,
    masked: bool,
    isolated: bool,
    incubation_countdown: u32,
}

impl Person {
    /// A healthy person. Immunocompromised people are never asymptomatic, so `asymptomatic`
    /// is ignored when `immunocompromised` is set.
    #[must_use]
    pub fn new(immunocompromised: bool, asymptomatic: bool) -> Self {
        Person {
            immunocompromised,
            asymptomatic: asymptomatic && !immunocompromised,
            ..Person::default()
        }
    }

    #[must_use]
    pub fn status(&self) -> InfectionStatus {
        self.status
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status != InfectionStatus::Dead
    }

    #[must_use]
    pub fn is_immunocompromised(&self) -> bool {
        self.immunocompromised
    }

    #[must_use]
    pub fn is_asymptomatic(&self) -> bool {
        self.asymptomatic
    }

    /// True once the person has recovered at least once. Survives reinfection.
    #[must_use]
    pub fn has_recovered(&self) -> bool {
        self.recovered
    }

    #[must_use]
    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    /// Days until a vaccine course in progress takes effect.
    #[must_use]
    pub fn vaccine_countdown(&self) -> u32 {
        self.vaccine_countdown
    }

    #[must_use]
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    #[must_use]
    pub fn incubation_countdown(&self) -> u32 {
        self.incubation_countdown
    }

    /// Sick people transmit, and so do infected people late in their incubation.
    #[must_use]
    pub fn is_transmitting(&self) -> bool {
        match self.status {
            InfectionStatus::Sick => true,
            InfectionStatus::Infected => self.incubation_countdown < PRESYMPTOMATIC_WINDOW,
            _ => false,
        }
    }

    fn ensure_alive(&self, action: &str) -> Result<(), SimError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(SimError::degenerate(format!("cannot {action} a dead person")))
        }
    }

    /// Starts an infection with the given incubation period.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` unless the person is healthy or recovered.
    pub fn infect(&mut self, incubation_period: u32) -> Result<(), SimError> {
        if !self.status.is_susceptible() {
            return Err(SimError::degenerate(format!(
                "cannot infect a {} person",
                self.status
            )));
        }
        self.status = InfectionStatus::Infected;
        self.incubation_countdown = incubation_period;
        Ok(())
    }

    /// Advances incubation by one day. An infected person whose countdown reaches zero
    /// becomes sick. Has no effect in any other status.
    pub fn sicken(&mut self) {
        if self.status != InfectionStatus::Infected {
            return;
        }
        self.incubation_countdown = self.incubation_countdown.saturating_sub(1);
        if self.incubation_countdown == 0 {
            self.status = InfectionStatus::Sick;
        }
    }

    /// Starts a vaccine course that takes effect after `activation_delay` days. Returns
    /// whether a course was started: sick people, people already vaccinated and people
    /// with a course in progress are left unchanged.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` if the person is dead.
    pub fn vaccinate(&mut self, activation_delay: u32) -> Result<bool, SimError> {
        self.ensure_alive("vaccinate")?;
        if self.vaccine_countdown != 0
            || self.vaccinated
            || self.status == InfectionStatus::Sick
        {
            return Ok(false);
        }
        self.vaccine_countdown = activation_delay;
        Ok(true)
    }

    /// Advances a vaccine course by one day. The person becomes vaccinated on the day the
    /// countdown goes from 1 to 0.
    pub fn activate_vaccine(&mut self) {
        if self.vaccine_countdown == 1 {
            self.vaccinated = true;
        }
        self.vaccine_countdown = self.vaccine_countdown.saturating_sub(1);
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` unless the person is infected or sick.
    pub fn recover(&mut self) -> Result<(), SimError> {
        if !self.status.is_active() {
            return Err(SimError::degenerate(format!(
                "cannot recover a {} person",
                self.status
            )));
        }
        self.status = InfectionStatus::Recovered;
        self.recovered = true;
        self.incubation_countdown = 0;
        Ok(())
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if the person is already dead.
    pub fn die(&mut self) -> Result<(), SimError> {
        self.ensure_alive("kill")?;
        self.status = InfectionStatus::Dead;
        self.masked = false;
        self.isolated = false;
        self.vaccine_countdown = 0;
        self.incubation_countdown = 0;
        Ok(())
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if the person is dead.
    pub fn mask(&mut self) -> Result<(), SimError> {
        self.ensure_alive("mask")?;
        self.masked = true;
        Ok(())
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if the person is dead.
    pub fn unmask(&mut self) -> Result<(), SimError> {
        self.ensure_alive("unmask")?;
        self.masked = false;
        Ok(())
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if the person is dead.
    pub fn isolate(&mut self) -> Result<(), SimError> {
        self.ensure_alive("isolate")?;
        self.isolated = true;
        Ok(())
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if the person is dead.
    pub fn unisolate(&mut self) -> Result<(), SimError> {
        self.ensure_alive("unisolate")?;
        self.isolated = false;
        Ok(())
    }

    /// Seeds the population: marks the person sick without an incubation period.
    pub(crate) fn make_sick(&mut self) -> Result<(), SimError> {
        self.ensure_alive("sicken")?;
        self.status = InfectionStatus::Sick;
        self.incubation_countdown = 0;
        Ok(())
    }

    /// Setup-time vaccination, which skips the activation delay.
    pub(crate) fn make_vaccinated(&mut self) {
        self.vaccinated = true;
        self.vaccine_countdown = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_vaccinated_for_test(&mut self) {
        self.make_vaccinated();
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        for (flag, label) in [
            (self.immunocompromised, "immunocompromised"),
            (self.asymptomatic, "asymptomatic"),
            (self.recovered, "previously recovered"),
            (self.vaccinated, "vaccinated"),
            (self.masked, "masked"),
            (self.isolated, "isolated"),
        ] {
            if flag {
                write!(f, ", {label}")?;
            }
        }
        if self.vaccine_countdown > 0 {
            write!(f, ", vaccine active in {} days", self.vaccine_countdown)?;
        }
        if self.status == InfectionStatus::Infected {
            write!(f, ", sick in {} days", self.incubation_countdown)?;
        }
        Ok(())
    }
}
