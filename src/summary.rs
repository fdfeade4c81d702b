//! End-of-run summary record.
use std::fmt::{self, Display};

use serde::Serialize;

use crate::error::SimError;
use crate::government::Government;
use crate::population::PopulationStats;

/// Counts at a point in the run, with percentages of the population at setup.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub virus: String,
    pub day: u32,
    pub initial_population: usize,
    pub current_population: usize,
    pub initial_infected: usize,
    pub healthy: usize,
    pub infected: usize,
    pub sick: usize,
    pub recovered: usize,
    pub untouched: usize,
    pub dead: usize,
    pub percentage_died: f64,
    pub percentage_untouched: f64,
    pub not_fully_vaccinated: usize,
    pub vaccinated: usize,
    pub vaccinated_percentage: f64,
    pub immunocompromised: usize,
    pub immunocompromised_percentage: f64,
    pub asymptomatic: usize,
    pub asymptomatic_percentage: f64,
    pub isolated: usize,
    pub isolated_percentage: f64,
    pub masked: usize,
    pub masked_percentage: f64,
    pub vaccine_mandate: bool,
    pub mask_mandate: bool,
    pub isolate_mandate: bool,
}

impl SimulationSummary {
    /// # Errors
    /// Returns `SimError::DegenerateState` if the population started empty.
    pub fn new(
        virus: &str,
        stats: &PopulationStats,
        initial_infected: usize,
        government: &Government,
    ) -> Result<Self, SimError> {
        let percent = |count| stats.percent_of_initial(count);
        Ok(SimulationSummary {
            virus: virus.to_string(),
            day: stats.day,
            initial_population: stats.initial_population,
            current_population: stats.alive,
            initial_infected,
            healthy: stats.healthy,
            infected: stats.infected,
            sick: stats.sick,
            recovered: stats.ever_recovered,
            untouched: stats.untouched,
            dead: stats.dead,
            percentage_died: percent(stats.dead)?,
            percentage_untouched: percent(stats.untouched)?,
            not_fully_vaccinated: stats.not_fully_vaccinated,
            vaccinated: stats.vaccinated,
            vaccinated_percentage: percent(stats.vaccinated)?,
            immunocompromised: stats.immunocompromised,
            immunocompromised_percentage: percent(stats.immunocompromised)?,
            asymptomatic: stats.asymptomatic,
            asymptomatic_percentage: percent(stats.asymptomatic)?,
            isolated: stats.isolated,
            isolated_percentage: percent(stats.isolated)?,
            masked: stats.masked,
            masked_percentage: percent(stats.masked)?,
            vaccine_mandate: government.vaccine_mandate(),
            mask_mandate: government.mask_mandate(),
            isolate_mandate: government.isolate_mandate(),
        })
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let share = |count: usize| count as f64 * 100.0 / self.initial_population as f64;
        writeln!(f, "Virus: {}", self.virus)?;
        writeln!(f, "Day {}:", self.day)?;
        for (label, count) in [
            ("healthy", self.healthy),
            ("infected", self.infected),
            ("sick", self.sick),
            ("recovered", self.recovered),
            ("untouched", self.untouched),
            ("dead", self.dead),
            ("not fully vaccinated", self.not_fully_vaccinated),
            ("vaccinated", self.vaccinated),
            ("immunocompromised", self.immunocompromised),
            ("asymptomatic", self.asymptomatic),
            ("isolated", self.isolated),
            ("masked", self.masked),
        ] {
            writeln!(
                f,
                "  {label}: {count} ({:.2}% of original population)",
                share(count)
            )?;
        }
        writeln!(f, "  vaccine mandate: {}", self.vaccine_mandate)?;
        writeln!(f, "  mask mandate: {}", self.mask_mandate)?;
        writeln!(f, "  isolate mandate: {}", self.isolate_mandate)
    }
}
