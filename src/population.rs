//! The simulated population: an arena of [`Person`] records and the contact graph that
//! links them.
//!
//! People live in a `Vec` indexed by [`PersonId`]. Death never removes a record; it marks
//! the person dead and removes their node (and edges) from the graph, so ids stay valid for
//! the whole run and counts of the dead can be taken straight from the arena.
use std::fmt::{self, Display};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::contact_graph::ContactGraph;
use crate::define_rng;
use crate::error::SimError;
use crate::person::{InfectionStatus, Person, PersonId};
use crate::random::RandomSource;

define_rng!(PopulationSetupRng);
define_rng!(InterventionRng);

/// How people respond to prevalence when no mandate is in force.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct BehaviorResponse {
    /// Infected fraction above which people adopt the behavior.
    pub threshold: f64,
    /// Infected fraction below which people drop it. Vaccination cannot be dropped, so the
    /// vaccination floor has no effect.
    pub floor: f64,
    /// Probability that a person does not respond.
    pub fail: f64,
}

impl Default for BehaviorResponse {
    fn default() -> Self {
        BehaviorResponse {
            threshold: 0.1,
            floor: 0.1,
            fail: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PopulationConfig {
    pub size: usize,
    /// People marked sick at setup.
    pub initial_infected: usize,
    /// Odds that any two people are connected in the contact graph.
    pub connection_odds: f64,
    /// Odds that a contact happens when either party is isolated.
    pub isolation_connection_odds: f64,
    pub immunocompromised_odds: f64,
    pub asymptomatic_odds: f64,
    pub vaccinated_odds: f64,
    /// Odds that a vaccine takes for an immunocompromised person.
    pub immunocompromised_vaccination_odds: f64,
    pub mask_odds: f64,
    pub mask: BehaviorResponse,
    pub isolate: BehaviorResponse,
    pub vaccinate: BehaviorResponse,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            size: 0,
            initial_infected: 0,
            connection_odds: 0.1,
            isolation_connection_odds: 0.1,
            immunocompromised_odds: 0.1,
            asymptomatic_odds: 0.1,
            vaccinated_odds: 0.1,
            immunocompromised_vaccination_odds: 0.1,
            mask_odds: 0.1,
            mask: BehaviorResponse::default(),
            isolate: BehaviorResponse::default(),
            vaccinate: BehaviorResponse::default(),
        }
    }
}

impl PopulationConfig {
    /// # Errors
    /// Returns `SimError::InvalidConfig` for odds outside [0, 1], negative thresholds and
    /// more seed infections than people.
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("connection_odds", self.connection_odds),
            ("isolation_connection_odds", self.isolation_connection_odds),
            ("immunocompromised_odds", self.immunocompromised_odds),
            ("asymptomatic_odds", self.asymptomatic_odds),
            ("vaccinated_odds", self.vaccinated_odds),
            (
                "immunocompromised_vaccination_odds",
                self.immunocompromised_vaccination_odds,
            ),
            ("mask_odds", self.mask_odds),
            ("mask.fail", self.mask.fail),
            ("isolate.fail", self.isolate.fail),
            ("vaccinate.fail", self.vaccinate.fail),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::invalid_config(format!(
                    "population.{name} must be in [0, 1], got {value}"
                )));
            }
        }
        for (name, response) in [
            ("mask", &self.mask),
            ("isolate", &self.isolate),
            ("vaccinate", &self.vaccinate),
        ] {
            if !response.threshold.is_finite()
                || !response.floor.is_finite()
                || response.threshold < 0.0
                || response.floor < 0.0
            {
                return Err(SimError::invalid_config(format!(
                    "population.{name} threshold and floor must be non-negative numbers"
                )));
            }
        }
        if self.initial_infected > self.size {
            return Err(SimError::invalid_config(format!(
                "cannot seed {} infections in a population of {}",
                self.initial_infected, self.size
            )));
        }
        Ok(())
    }
}

/// Counts taken in a single pass over the population.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationStats {
    pub day: u32,
    pub initial_population: usize,
    pub alive: usize,
    pub healthy: usize,
    pub infected: usize,
    pub sick: usize,
    /// People whose current status is recovered.
    pub recovered: usize,
    pub dead: usize,
    /// Live people who have recovered at least once, whatever their current status.
    pub ever_recovered: usize,
    pub untouched: usize,
    pub vaccinated: usize,
    pub not_fully_vaccinated: usize,
    pub immunocompromised: usize,
    pub asymptomatic: usize,
    pub masked: usize,
    pub isolated: usize,
}

impl PopulationStats {
    /// Infected plus sick.
    #[must_use]
    pub fn active(&self) -> usize {
        self.infected + self.sick
    }

    /// `count` as a fraction of the live population.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` if nobody is alive.
    pub fn fraction_of_alive(&self, count: usize) -> Result<f64, SimError> {
        if self.alive == 0 {
            return Err(SimError::degenerate(
                "fraction of an empty population is undefined",
            ));
        }
        Ok(count as f64 / self.alive as f64)
    }

    /// `count` as a percentage of the population at setup.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` if the population started empty.
    pub fn percent_of_initial(&self, count: usize) -> Result<f64, SimError> {
        if self.initial_population == 0 {
            return Err(SimError::degenerate(
                "percentage of an empty population is undefined",
            ));
        }
        Ok(count as f64 * 100.0 / self.initial_population as f64)
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    config: PopulationConfig,
    people: Vec<Person>,
    graph: ContactGraph,
    days: u32,
}

impl Population {
    /// Generates the contact graph, draws each person's initial attributes and marks
    /// `initial_infected` distinct people sick.
    ///
    /// # Errors
    /// Returns `SimError::InvalidConfig` if `config` fails validation.
    pub fn new(config: PopulationConfig, random: &mut RandomSource) -> Result<Self, SimError> {
        config.validate()?;
        let graph = random.sample(PopulationSetupRng, |rng| {
            ContactGraph::erdos_renyi(config.size, config.connection_odds, rng)
        })?;

        let mut people = Vec::with_capacity(config.size);
        for _ in 0..config.size {
            let immunocompromised =
                random.sample_bool(PopulationSetupRng, config.immunocompromised_odds);
            let asymptomatic = !immunocompromised
                && random.sample_bool(PopulationSetupRng, config.asymptomatic_odds);
            let vaccinated_odds = if immunocompromised {
                config.vaccinated_odds * config.immunocompromised_vaccination_odds
            } else {
                config.vaccinated_odds
            };
            let mut person = Person::new(immunocompromised, asymptomatic);
            if random.sample_bool(PopulationSetupRng, vaccinated_odds) {
                person.make_vaccinated();
            }
            if random.sample_bool(PopulationSetupRng, config.mask_odds) {
                person.mask()?;
            }
            people.push(person);
        }

        let ids: Vec<PersonId> = graph.nodes().collect();
        for id in random.sample_multiple(PopulationSetupRng, &ids, config.initial_infected) {
            people[id.index()].make_sick()?;
        }

        info!(
            "set up population of {} with {} contacts and {} seed infections",
            config.size,
            graph.edge_count(),
            config.initial_infected
        );
        Ok(Population {
            config,
            people,
            graph,
            days: 0,
        })
    }

    /// Assembles a population from explicit people and contacts. `config` supplies the
    /// behavioral odds; its `size` and `initial_infected` are overwritten to match `people`.
    ///
    /// # Errors
    /// Returns `SimError::InvalidConfig` if the behavioral odds are invalid or if `people`
    /// and `graph` disagree on the number of people, and `SimError::DegenerateState` if a
    /// person is already dead.
    pub fn from_parts(
        mut config: PopulationConfig,
        people: Vec<Person>,
        graph: ContactGraph,
    ) -> Result<Self, SimError> {
        if people.len() != graph.slot_count() || graph.node_count() != graph.slot_count() {
            return Err(SimError::invalid_config(format!(
                "{} people do not match a contact graph of {} nodes",
                people.len(),
                graph.node_count()
            )));
        }
        if people.iter().any(|person| !person.is_alive()) {
            return Err(SimError::degenerate(
                "a population cannot start with dead people",
            ));
        }
        config.size = people.len();
        config.initial_infected = people
            .iter()
            .filter(|person| person.status().is_active())
            .count();
        config.validate()?;
        Ok(Population {
            config,
            people,
            graph,
            days: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    #[must_use]
    pub fn graph(&self) -> &ContactGraph {
        &self.graph
    }

    /// Number of completed steps.
    #[must_use]
    pub fn days(&self) -> u32 {
        self.days
    }

    pub(crate) fn advance_day(&mut self) {
        self.days += 1;
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` for an id outside the population.
    pub fn person(&self, id: PersonId) -> Result<&Person, SimError> {
        self.people
            .get(id.index())
            .ok_or_else(|| SimError::degenerate(format!("{id} is not in the population")))
    }

    pub(crate) fn person_mut(&mut self, id: PersonId) -> Result<&mut Person, SimError> {
        self.people
            .get_mut(id.index())
            .ok_or_else(|| SimError::degenerate(format!("{id} is not in the population")))
    }

    /// Live people in id order.
    pub fn people(&self) -> impl Iterator<Item = (PersonId, &Person)> + '_ {
        self.people
            .iter()
            .enumerate()
            .filter(|(_, person)| person.is_alive())
            .map(|(index, person)| (PersonId::new(index), person))
    }

    /// Ids of live people in id order.
    pub fn live_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.graph.nodes()
    }

    #[must_use]
    pub fn initial_population(&self) -> usize {
        self.people.len()
    }

    #[must_use]
    pub fn initial_infected(&self) -> usize {
        self.config.initial_infected
    }

    #[must_use]
    pub fn current_population(&self) -> usize {
        self.graph.node_count()
    }

    fn count(&self, predicate: impl Fn(&Person) -> bool) -> usize {
        self.people().filter(|(_, person)| predicate(person)).count()
    }

    #[must_use]
    pub fn count_status(&self, status: InfectionStatus) -> usize {
        if status == InfectionStatus::Dead {
            return self.dead();
        }
        self.count(|person| person.status() == status)
    }

    #[must_use]
    pub fn healthy(&self) -> usize {
        self.count_status(InfectionStatus::Healthy)
    }

    #[must_use]
    pub fn infected(&self) -> usize {
        self.count_status(InfectionStatus::Infected)
    }

    #[must_use]
    pub fn sick(&self) -> usize {
        self.count_status(InfectionStatus::Sick)
    }

    /// Live people who have recovered at least once.
    #[must_use]
    pub fn recovered(&self) -> usize {
        self.count(Person::has_recovered)
    }

    #[must_use]
    pub fn dead(&self) -> usize {
        self.initial_population() - self.current_population()
    }

    /// Live people who were never infected.
    #[must_use]
    pub fn untouched(&self) -> usize {
        self.count(|person| {
            person.status() == InfectionStatus::Healthy && !person.has_recovered()
        })
    }

    #[must_use]
    pub fn vaccinated(&self) -> usize {
        self.count(Person::is_vaccinated)
    }

    /// Live people with more than one day left on a vaccine course.
    #[must_use]
    pub fn not_fully_vaccinated(&self) -> usize {
        self.count(|person| person.vaccine_countdown() > 1)
    }

    #[must_use]
    pub fn asymptomatic(&self) -> usize {
        self.count(Person::is_asymptomatic)
    }

    #[must_use]
    pub fn immunocompromised(&self) -> usize {
        self.count(Person::is_immunocompromised)
    }

    #[must_use]
    pub fn masked(&self) -> usize {
        self.count(Person::is_masked)
    }

    #[must_use]
    pub fn isolated(&self) -> usize {
        self.count(Person::is_isolated)
    }

    #[must_use]
    pub fn stats(&self) -> PopulationStats {
        let mut stats = PopulationStats {
            day: self.days,
            initial_population: self.initial_population(),
            alive: self.current_population(),
            dead: self.dead(),
            ..PopulationStats::default()
        };
        for (_, person) in self.people() {
            match person.status() {
                InfectionStatus::Healthy => stats.healthy += 1,
                InfectionStatus::Infected => stats.infected += 1,
                InfectionStatus::Sick => stats.sick += 1,
                InfectionStatus::Recovered => stats.recovered += 1,
                InfectionStatus::Dead => {}
            }
            let flags = [
                (person.has_recovered(), &mut stats.ever_recovered),
                (
                    person.status() == InfectionStatus::Healthy && !person.has_recovered(),
                    &mut stats.untouched,
                ),
                (person.is_vaccinated(), &mut stats.vaccinated),
                (person.vaccine_countdown() > 1, &mut stats.not_fully_vaccinated),
                (person.is_immunocompromised(), &mut stats.immunocompromised),
                (person.is_asymptomatic(), &mut stats.asymptomatic),
                (person.is_masked(), &mut stats.masked),
                (person.is_isolated(), &mut stats.isolated),
            ];
            for (set, counter) in flags {
                *counter += usize::from(set);
            }
        }
        stats
    }

    /// Kills `id` and removes them from the contact graph.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or already dead.
    pub fn kill(&mut self, id: PersonId) -> Result<(), SimError> {
        self.person_mut(id)?.die()?;
        self.graph.remove_node(id)?;
        Ok(())
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or not susceptible.
    pub fn infect(&mut self, id: PersonId, incubation_period: u32) -> Result<(), SimError> {
        self.person_mut(id)?.infect(incubation_period)
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or not infected or sick.
    pub fn recover(&mut self, id: PersonId) -> Result<(), SimError> {
        self.person_mut(id)?.recover()
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or dead.
    pub fn mask(&mut self, id: PersonId) -> Result<(), SimError> {
        self.person_mut(id)?.mask()
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or dead.
    pub fn unmask(&mut self, id: PersonId) -> Result<(), SimError> {
        self.person_mut(id)?.unmask()
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or dead.
    pub fn isolate(&mut self, id: PersonId) -> Result<(), SimError> {
        self.person_mut(id)?.isolate()
    }

    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or dead.
    pub fn unisolate(&mut self, id: PersonId) -> Result<(), SimError> {
        self.person_mut(id)?.unisolate()
    }

    /// Starts a vaccine course for `id`. For immunocompromised people the course only
    /// starts with probability `immunocompromised_vaccination_odds`. Returns whether a
    /// course was started.
    ///
    /// # Errors
    /// Returns `SimError::DegenerateState` if `id` is unknown or dead.
    pub fn vaccinate_agent(
        &mut self,
        id: PersonId,
        activation_delay: u32,
        random: &mut RandomSource,
    ) -> Result<bool, SimError> {
        let odds = self.config.immunocompromised_vaccination_odds;
        let person = self.person_mut(id)?;
        if !person.is_alive() {
            return Err(SimError::degenerate(format!("cannot vaccinate dead {id}")));
        }
        if person.is_immunocompromised() && !random.sample_bool(InterventionRng, odds) {
            return Ok(false);
        }
        person.vaccinate(activation_delay)
    }

    fn pick_live(&self, count: usize, random: &mut RandomSource) -> Vec<PersonId> {
        let ids: Vec<PersonId> = self.live_ids().collect();
        random.sample_multiple(InterventionRng, &ids, count)
    }

    /// Offers vaccination to `count` distinct live people chosen uniformly. Returns the
    /// number of courses started.
    ///
    /// # Errors
    /// Propagates errors from [`Population::vaccinate_agent`].
    pub fn vaccinate_random(
        &mut self,
        count: usize,
        activation_delay: u32,
        random: &mut RandomSource,
    ) -> Result<usize, SimError> {
        let mut started = 0;
        for id in self.pick_live(count, random) {
            started += usize::from(self.vaccinate_agent(id, activation_delay, random)?);
        }
        debug!("vaccination drive started {started} of {count} requested courses");
        Ok(started)
    }

    /// Masks `count` distinct live people chosen uniformly. Returns how many were picked.
    ///
    /// # Errors
    /// Never fails for live people; errors are propagated for consistency.
    pub fn mask_random(
        &mut self,
        count: usize,
        random: &mut RandomSource,
    ) -> Result<usize, SimError> {
        let picked = self.pick_live(count, random);
        for &id in &picked {
            self.mask(id)?;
        }
        Ok(picked.len())
    }

    /// Isolates `count` distinct live people chosen uniformly. Returns how many were picked.
    ///
    /// # Errors
    /// Never fails for live people; errors are propagated for consistency.
    pub fn isolate_random(
        &mut self,
        count: usize,
        random: &mut RandomSource,
    ) -> Result<usize, SimError> {
        let picked = self.pick_live(count, random);
        for &id in &picked {
            self.isolate(id)?;
        }
        Ok(picked.len())
    }
}

impl Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        writeln!(f, "Day: {}", stats.day)?;
        writeln!(f, "Initial population: {}", stats.initial_population)?;
        writeln!(f, "Current population: {}", stats.alive)?;
        for (label, value) in [
            ("Healthy", stats.healthy),
            ("Infected", stats.infected),
            ("Sick", stats.sick),
            ("Recovered", stats.ever_recovered),
            ("Dead", stats.dead),
            ("Vaccinated", stats.vaccinated),
            ("Immunocompromised", stats.immunocompromised),
            ("Asymptomatic", stats.asymptomatic),
            ("Masked", stats.masked),
            ("Isolated", stats.isolated),
        ] {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}
