//! Odds of a single source passing the virus to a single neighbor.
//!
//! A transmission attempt is a chain of independent Bernoulli gates and the attempt
//! succeeds only if every gate passes. This is stricter than one draw against the product of
//! the gates whenever a gate probability has to be clamped. Each modifier group contributes
//! a gate of the form `(1 - m_source) * (1 - m_target)`, where a factor is only present when
//! the party belongs to the group.
use crate::person::Person;
use crate::virus::{Modifiers, TransmissionChannel, VirusProfile};

/// Number of gates in [`infection_gates`].
pub const GATE_COUNT: usize = 6;

/// Odds that a contact between `source` and `target` happens at all.
#[must_use]
pub fn contact_odds(isolation_connection_odds: f64, source: &Person, target: &Person) -> f64 {
    if source.is_isolated() || target.is_isolated() {
        isolation_connection_odds
    } else {
        1.0
    }
}

fn group_gate(
    modifiers: &Modifiers,
    source_in_group: bool,
    target_in_group: bool,
) -> f64 {
    let source = if source_in_group { 1.0 - modifiers.infection } else { 1.0 };
    let target = if target_in_group { 1.0 - modifiers.contraction } else { 1.0 };
    source * target
}

/// The gate probabilities for one attempt over `channel`, in draw order: base channel odds,
/// immunocompromised, vaccinated, masks, previously recovered, asymptomatic.
#[must_use]
pub fn infection_gates(
    virus: &VirusProfile,
    channel: &TransmissionChannel,
    source: &Person,
    target: &Person,
) -> [f64; GATE_COUNT] {
    let mask = |masked: bool| if masked { 1.0 - channel.mask_effectiveness } else { 1.0 };
    [
        channel.base_odds(),
        group_gate(
            virus.immunocompromised_modifiers(),
            source.is_immunocompromised(),
            target.is_immunocompromised(),
        ),
        group_gate(
            virus.vaccinated_modifiers(),
            source.is_vaccinated(),
            target.is_vaccinated(),
        ),
        mask(source.is_masked()) * mask(target.is_masked()),
        group_gate(
            virus.recovered_modifiers(),
            source.has_recovered(),
            target.has_recovered(),
        ),
        group_gate(
            virus.asymptomatic_modifiers(),
            source.is_asymptomatic(),
            target.is_asymptomatic(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::define_rng;
    use crate::random::RandomSource;
    use crate::virus::VirusConfig;

    define_rng!(GateRng);

    fn profile() -> VirusProfile {
        VirusProfile::new(&VirusConfig {
            infectiousness: vec![0.8],
            contraction: vec![0.5],
            mask_effectiveness: vec![0.7],
            ..VirusConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn plain_contact_only_has_base_gate() {
        let virus = profile();
        let channel = *virus.channels().get(0).unwrap();
        let a = Person::new(false, false);
        let b = Person::new(false, false);
        let gates = infection_gates(&virus, &channel, &a, &b);
        assert_relative_eq!(gates[0], 0.4);
        assert!(gates[1..].iter().all(|g| (*g - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn masks_apply_per_party() {
        let virus = profile();
        let channel = *virus.channels().get(0).unwrap();
        let mut a = Person::new(false, false);
        let mut b = Person::new(false, false);
        a.mask().unwrap();
        assert_relative_eq!(infection_gates(&virus, &channel, &a, &b)[3], 0.3);
        b.mask().unwrap();
        assert_relative_eq!(infection_gates(&virus, &channel, &a, &b)[3], 0.3 * 0.3);
    }

    #[test]
    fn group_gates_use_source_infection_and_target_contraction() {
        let virus = profile();
        let channel = *virus.channels().get(0).unwrap();
        let mut source = Person::new(false, true);
        source.set_vaccinated_for_test();
        let target = Person::new(false, true);
        let gates = infection_gates(&virus, &channel, &source, &target);
        // vaccinated infection modifier 0.6 on the source only
        assert_relative_eq!(gates[2], 0.4);
        // asymptomatic contraction modifier 1.0 blocks the target entirely
        assert_relative_eq!(gates[5], 0.0);
    }

    #[test]
    fn immunocompromised_gate_is_clamped() {
        let virus = profile();
        let channel = *virus.channels().get(0).unwrap();
        let source = Person::new(true, false);
        let target = Person::new(false, false);
        let gates = infection_gates(&virus, &channel, &source, &target);
        // 1 - 1.5 is negative, which blocks transmission once the draw clamps it
        assert_relative_eq!(gates[1], -0.5);
        let mut random = RandomSource::new(0);
        assert!((0..100).all(|_| !random.sample_bool(GateRng, gates[1])));
    }

    #[test]
    fn isolation_reduces_contact() {
        let mut a = Person::new(false, false);
        let b = Person::new(false, false);
        assert_relative_eq!(contact_odds(0.1, &a, &b), 1.0);
        a.isolate().unwrap();
        assert_relative_eq!(contact_odds(0.1, &a, &b), 0.1);
        assert_relative_eq!(contact_odds(0.1, &b, &a), 0.1);
    }
}
