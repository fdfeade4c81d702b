//! Daily masking, isolation and vaccination decisions.
//!
//! Decisions read a [`DaySnapshot`] taken before anyone acts, so the order people are
//! visited in never changes the odds anyone sees. The functions here only compute odds;
//! the engine draws against them.
use crate::error::SimError;
use crate::government::Government;
use crate::population::{BehaviorResponse, PopulationStats};

/// Statistics frozen at the start of a day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySnapshot {
    pub day: u32,
    /// Infected plus sick, as a fraction of the live population.
    pub infected: f64,
    pub masked: f64,
    pub isolated: f64,
    pub vaccinated: f64,
    pub vaccine_available: bool,
}

impl DaySnapshot {
    /// # Errors
    /// Returns `SimError::DegenerateState` if nobody is alive.
    pub fn new(stats: &PopulationStats, vaccine_available: bool) -> Result<Self, SimError> {
        Ok(DaySnapshot {
            day: stats.day,
            infected: stats.fraction_of_alive(stats.active())?,
            masked: stats.fraction_of_alive(stats.masked)?,
            isolated: stats.fraction_of_alive(stats.isolated)?,
            vaccinated: stats.fraction_of_alive(stats.vaccinated)?,
            vaccine_available,
        })
    }
}

/// Odds of taking up or dropping a behavior today.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Adopt(f64),
    Abandon(f64),
}

/// Masking: mandated coverage first, otherwise a response to prevalence.
#[must_use]
pub fn masking(
    sick: bool,
    snapshot: &DaySnapshot,
    government: &Government,
    response: &BehaviorResponse,
) -> Option<Decision> {
    if government.mask_mandate() {
        let fail = government.config().mask.fail;
        return (sick || snapshot.masked < government.config().mask.amount)
            .then(|| Decision::Adopt(if sick { 1.0 - fail / 10.0 } else { 1.0 - fail }));
    }
    prevalence_response(sick, snapshot.infected, response)
}

/// Isolation: sick people isolate under a mandate even once coverage is met, with their
/// own failure rate.
#[must_use]
pub fn isolation(
    sick: bool,
    snapshot: &DaySnapshot,
    government: &Government,
    response: &BehaviorResponse,
) -> Option<Decision> {
    if government.isolate_mandate() {
        let config = government.config();
        return (sick || snapshot.isolated < config.isolate.amount).then(|| {
            Decision::Adopt(if sick {
                1.0 - config.sick_isolate_fail
            } else {
                1.0 - config.isolate.fail
            })
        });
    }
    if sick {
        return Some(Decision::Adopt(1.0 - response.fail / 3.0));
    }
    prevalence_response(sick, snapshot.infected, response)
}

/// Odds of starting a vaccine course today, if any.
#[must_use]
pub fn vaccination(
    snapshot: &DaySnapshot,
    government: &Government,
    response: &BehaviorResponse,
) -> Option<f64> {
    if !snapshot.vaccine_available {
        return None;
    }
    if government.vaccine_mandate() {
        let mandate = &government.config().vaccinate;
        return (snapshot.vaccinated < mandate.amount).then_some(1.0 - mandate.fail);
    }
    (snapshot.infected > response.threshold).then_some(1.0 - response.fail)
}

// Sick people are three times less likely to fail to respond.
fn prevalence_response(
    sick: bool,
    infected: f64,
    response: &BehaviorResponse,
) -> Option<Decision> {
    let fail = if sick { response.fail / 3.0 } else { response.fail };
    if infected > response.threshold {
        Some(Decision::Adopt(1.0 - fail))
    } else if infected < response.floor {
        Some(Decision::Abandon(fail))
    } else {
        None
    }
}
