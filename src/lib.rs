//! A contact-graph epidemic simulator.
//!
//! People are nodes of a static random contact graph. Each simulated day, sick and late
//! incubating people try to infect their healthy neighbors over one of the virus's
//! transmission channels, sick people die or recover, and everyone decides whether to mask,
//! isolate or get vaccinated. Those decisions respond to prevalence, and to government
//! mandates that switch on and off with hysteresis.
//!
//! The central object is the [`VirusSimulation`], which owns:
//! * a [`VirusProfile`] holding the pathogen's odds and modifiers,
//! * a [`Population`] of people and their contact graph,
//! * a [`Government`] with three mandate toggles,
//! * a seeded [`RandomSource`](random::RandomSource), so a run is reproducible from its
//!   configuration and seed.
//!
//! ```
//! use virus_sim::{SimulationConfig, VirusSimulation};
//!
//! let mut config = SimulationConfig::default();
//! config.population.size = 200;
//! config.population.initial_infected = 2;
//!
//! let mut simulation = VirusSimulation::new(&config, 42).unwrap();
//! while simulation.step().unwrap() && simulation.day() < 100 {}
//! println!("{}", simulation.summary().unwrap());
//! ```
pub mod behavior;
pub mod config;
pub mod contact_graph;
pub mod error;
pub mod government;
pub mod hashing;
pub mod log;
pub mod person;
pub mod population;
pub mod random;
pub mod runner;
pub mod simulation;
pub mod summary;
pub mod transmission;
pub mod virus;

pub use config::{load_config, SimulationConfig};
pub use contact_graph::ContactGraph;
pub use error::SimError;
pub use government::{Government, GovernmentConfig, MandateConfig};
pub use person::{InfectionStatus, Person, PersonId};
pub use population::{BehaviorResponse, Population, PopulationConfig, PopulationStats};
pub use simulation::VirusSimulation;
pub use summary::SimulationSummary;
pub use virus::{Modifiers, VaccineSchedule, VirusConfig, VirusProfile};

// Re-export for macros
pub use rand;
