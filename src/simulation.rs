//! The simulation engine.
//!
//! A [`VirusSimulation`] owns the virus, the population, the government and the random
//! source. Each call to [`VirusSimulation::step`] runs one day:
//!
//! 1. snapshot the day's statistics and advance the day counter,
//! 2. sweep every live person: vaccine activation, behavior decisions, exposure of their
//!    neighbors and their own disease outcome,
//! 3. commit the day's outcomes in order: deaths, recoveries, then new infections,
//! 4. recompute the government mandates from the day-end statistics.
//!
//! Nothing the sweep decides about infection, recovery or death is applied until the sweep
//! has finished, so a person infected today cannot infect anyone until tomorrow.
use std::fmt::{self, Display};

use indexmap::IndexSet;
use log::{debug, trace};

use crate::behavior::{self, DaySnapshot, Decision};
use crate::config::SimulationConfig;
use crate::define_rng;
use crate::error::SimError;
use crate::government::Government;
use crate::person::{InfectionStatus, Person, PersonId};
use crate::population::{Population, PopulationStats};
use crate::random::RandomSource;
use crate::summary::SimulationSummary;
use crate::transmission::{contact_odds, infection_gates};
use crate::virus::VirusProfile;

define_rng!(BehaviorRng);
define_rng!(TransmissionRng);
define_rng!(OutcomeRng);

/// Outcomes collected during the sweep, applied once it ends.
#[derive(Debug, Default)]
struct DayOutcomes {
    deaths: IndexSet<PersonId>,
    recoveries: IndexSet<PersonId>,
    infections: IndexSet<PersonId>,
}

pub struct VirusSimulation {
    virus: VirusProfile,
    population: Population,
    government: Government,
    random: RandomSource,
}

impl VirusSimulation {
    /// Builds every component from `config`. The same config and seed always produce the
    /// same run.
    ///
    /// # Errors
    /// Returns `SimError::InvalidConfig` if `config` fails validation.
    pub fn new(config: &SimulationConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let mut random = RandomSource::new(seed);
        let virus = VirusProfile::new(&config.virus)?;
        let population = Population::new(config.population.clone(), &mut random)?;
        let government = Government::new(config.government)?;
        Ok(VirusSimulation {
            virus,
            population,
            government,
            random,
        })
    }

    /// Assembles a simulation from components that were built separately.
    #[must_use]
    pub fn from_parts(
        virus: VirusProfile,
        population: Population,
        government: Government,
        seed: u64,
    ) -> Self {
        VirusSimulation {
            virus,
            population,
            government,
            random: RandomSource::new(seed),
        }
    }

    #[must_use]
    pub fn virus(&self) -> &VirusProfile {
        &self.virus
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    #[must_use]
    pub fn government(&self) -> &Government {
        &self.government
    }

    pub fn government_mut(&mut self) -> &mut Government {
        &mut self.government
    }

    /// Number of completed days.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.population.days()
    }

    /// Offers vaccination to `count` random live people. See
    /// [`Population::vaccinate_random`].
    ///
    /// # Errors
    /// Propagates errors from the population.
    pub fn vaccinate_random(&mut self, count: usize) -> Result<usize, SimError> {
        let delay = self.virus.vaccine_activation_delay();
        self.population.vaccinate_random(count, delay, &mut self.random)
    }

    /// # Errors
    /// Propagates errors from the population.
    pub fn mask_random(&mut self, count: usize) -> Result<usize, SimError> {
        self.population.mask_random(count, &mut self.random)
    }

    /// # Errors
    /// Propagates errors from the population.
    pub fn isolate_random(&mut self, count: usize) -> Result<usize, SimError> {
        self.population.isolate_random(count, &mut self.random)
    }

    /// Runs one day. Returns whether anyone is infected or sick at the end of it.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` if nobody is alive at the start of the day.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let start = self.population.stats();
        if start.alive == 0 {
            return Err(SimError::degenerate("cannot step an empty population"));
        }
        let snapshot = DaySnapshot::new(&start, self.virus.vaccine_available(start.day))?;
        self.population.advance_day();

        if start.active() == 0 {
            debug!("day {}: no active infections", start.day);
            return Ok(false);
        }

        let mut outcomes = DayOutcomes::default();
        let ids: Vec<PersonId> = self.population.live_ids().collect();
        for id in ids {
            self.decide(id, &snapshot)?;
            self.expose_neighbors(id, &mut outcomes)?;
            self.resolve(id, &mut outcomes)?;
        }
        self.commit(&outcomes)?;

        let end = self.population.stats();
        debug!(
            "day {}: {} infected, {} sick, {} dead, {} alive",
            start.day, end.infected, end.sick, end.dead, end.alive
        );
        if end.alive == 0 {
            return Ok(false);
        }
        self.government.update(
            end.fraction_of_alive(end.active())?,
            end.fraction_of_alive(end.dead)?,
        );
        Ok(end.active() > 0)
    }

    /// Steps until no infections remain or `max_days` days have passed in total. Returns
    /// the statistics at the start and after every step.
    ///
    /// # Errors
    /// Propagates errors from [`VirusSimulation::step`].
    pub fn run(&mut self, max_days: u32) -> Result<Vec<PopulationStats>, SimError> {
        self.run_with_observer(max_days, |_| {})
    }

    /// Like [`VirusSimulation::run`], calling `observer` with the statistics after every
    /// step.
    ///
    /// # Errors
    /// Propagates errors from [`VirusSimulation::step`].
    pub fn run_with_observer(
        &mut self,
        max_days: u32,
        mut observer: impl FnMut(&PopulationStats),
    ) -> Result<Vec<PopulationStats>, SimError> {
        let mut history = vec![self.population.stats()];
        while self.population.days() < max_days {
            let active = self.step()?;
            let stats = self.population.stats();
            observer(&stats);
            history.push(stats);
            if !active {
                break;
            }
        }
        Ok(history)
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if the population started empty.
    pub fn summary(&self) -> Result<SimulationSummary, SimError> {
        SimulationSummary::new(
            self.virus.name(),
            &self.population.stats(),
            self.population.initial_infected(),
            &self.government,
        )
    }

    fn decide(&mut self, id: PersonId, snapshot: &DaySnapshot) -> Result<(), SimError> {
        let VirusSimulation {
            virus,
            population,
            government,
            random,
        } = self;
        let config = population.config();
        let (mask, isolate, vaccinate) = (config.mask, config.isolate, config.vaccinate);
        let person = population.person_mut(id)?;

        person.activate_vaccine();
        let sick = person.status() == InfectionStatus::Sick;
        apply_decision(
            random,
            person,
            behavior::masking(sick, snapshot, government, &mask),
            Person::mask,
            Person::unmask,
        )?;
        apply_decision(
            random,
            person,
            behavior::isolation(sick, snapshot, government, &isolate),
            Person::isolate,
            Person::unisolate,
        )?;
        if let Some(odds) = behavior::vaccination(snapshot, government, &vaccinate) {
            if random.sample_bool(BehaviorRng, odds) {
                person.vaccinate(virus.vaccine_activation_delay())?;
            }
        }
        Ok(())
    }

    fn expose_neighbors(
        &mut self,
        id: PersonId,
        outcomes: &mut DayOutcomes,
    ) -> Result<(), SimError> {
        let VirusSimulation {
            virus,
            population,
            random,
            ..
        } = self;
        let (virus, population): (&VirusProfile, &Population) = (virus, population);
        let source = population.person(id)?;
        if !source.is_transmitting() {
            return Ok(());
        }
        let isolation_odds = population.config().isolation_connection_odds;

        for &neighbor_id in population.graph().neighbors(id) {
            if outcomes.infections.contains(&neighbor_id) {
                continue;
            }
            let neighbor = population.person(neighbor_id)?;
            if !neighbor.status().is_susceptible() {
                continue;
            }
            let contact = contact_odds(isolation_odds, source, neighbor);
            if !random.sample_bool(TransmissionRng, contact) {
                continue;
            }
            let index = random.sample_range(TransmissionRng, 0..virus.channels().len());
            let Some(channel) = virus.channels().get(index) else {
                continue;
            };
            let gates = infection_gates(virus, channel, source, neighbor);
            if gates.iter().all(|&odds| random.sample_bool(TransmissionRng, odds)) {
                trace!("{id} infected {neighbor_id} over channel {index}");
                outcomes.infections.insert(neighbor_id);
            }
        }
        Ok(())
    }

    fn resolve(&mut self, id: PersonId, outcomes: &mut DayOutcomes) -> Result<(), SimError> {
        let VirusSimulation {
            virus,
            population,
            random,
            ..
        } = self;
        let person = population.person_mut(id)?;
        match person.status() {
            InfectionStatus::Sick => {
                if random.sample_bool(OutcomeRng, virus.death_odds(person)) {
                    outcomes.deaths.insert(id);
                } else if random.sample_bool(OutcomeRng, virus.recovery_odds(person)) {
                    outcomes.recoveries.insert(id);
                }
            }
            InfectionStatus::Infected => {
                person.sicken();
                if person.is_vaccinated()
                    && random.sample_bool(OutcomeRng, virus.vaccinated_modifiers().recovery)
                {
                    outcomes.recoveries.insert(id);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn commit(&mut self, outcomes: &DayOutcomes) -> Result<(), SimError> {
        for &id in &outcomes.deaths {
            self.population.kill(id)?;
        }
        for &id in &outcomes.recoveries {
            self.population.recover(id)?;
        }
        let incubation_period = self.virus.incubation_period();
        for &id in &outcomes.infections {
            self.population.infect(id, incubation_period)?;
        }
        debug!(
            "day {}: {} deaths, {} recoveries, {} new infections",
            self.population.days(),
            outcomes.deaths.len(),
            outcomes.recoveries.len(),
            outcomes.infections.len()
        );
        Ok(())
    }
}

fn apply_decision(
    random: &mut RandomSource,
    person: &mut Person,
    decision: Option<Decision>,
    adopt: fn(&mut Person) -> Result<(), SimError>,
    abandon: fn(&mut Person) -> Result<(), SimError>,
) -> Result<(), SimError> {
    match decision {
        Some(Decision::Adopt(odds)) if random.sample_bool(BehaviorRng, odds) => adopt(person),
        Some(Decision::Abandon(odds)) if random.sample_bool(BehaviorRng, odds) => abandon(person),
        _ => Ok(()),
    }
}

impl Display for VirusSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.summary() {
            Ok(summary) => write!(f, "{summary}"),
            Err(_) => writeln!(f, "Day {}: empty population", self.day()),
        }
    }
}

impl fmt::Debug for VirusSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirusSimulation")
            .field("virus", &self.virus)
            .field("day", &self.day())
            .field("government", &self.government)
            .field("random", &self.random)
            .finish_non_exhaustive()
    }
}
