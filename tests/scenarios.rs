use virus_sim::{
    ContactGraph, Government, GovernmentConfig, InfectionStatus, Modifiers, Person, PersonId,
    Population, PopulationConfig, SimulationConfig, VaccineSchedule, VirusConfig, VirusProfile,
    VirusSimulation,
};

fn certain_virus() -> VirusConfig {
    VirusConfig {
        recovery_odds: 0.0,
        death_odds: 0.0,
        incubation_period: 0,
        infectiousness: vec![1.0],
        contraction: vec![1.0],
        mask_effectiveness: vec![0.0],
        asymptomatic: Modifiers::NEUTRAL,
        immunocompromised: Modifiers::NEUTRAL,
        vaccinated: Modifiers::NEUTRAL,
        recovered: Modifiers::NEUTRAL,
        ..VirusConfig::default()
    }
}

fn no_interventions(
    size: usize,
    initial_infected: usize,
    connection_odds: f64,
) -> PopulationConfig {
    PopulationConfig {
        size,
        initial_infected,
        connection_odds,
        isolation_connection_odds: 1.0,
        immunocompromised_odds: 0.0,
        asymptomatic_odds: 0.0,
        vaccinated_odds: 0.0,
        mask_odds: 0.0,
        ..PopulationConfig::default()
    }
}

#[test]
fn complete_graph_with_certain_transmission_infects_everyone_on_day_one() {
    let config = SimulationConfig {
        virus: certain_virus(),
        population: no_interventions(100, 1, 1.0),
        government: GovernmentConfig::default(),
    };
    let mut simulation = VirusSimulation::new(&config, 2024).unwrap();
    assert_eq!(simulation.population().graph().edge_count(), 100 * 99 / 2);

    assert!(simulation.step().unwrap());
    let population = simulation.population();
    assert_eq!(population.sick(), 1);
    assert_eq!(population.infected(), 99);
    assert_eq!(population.healthy(), 0);
    assert_eq!(population.dead(), 0);
}

#[test]
fn vaccinated_count_is_fixed_when_vaccine_never_exists() {
    let mut population = no_interventions(400, 10, 0.05);
    population.vaccinated_odds = 0.3;
    population.vaccinate.threshold = 0.0;
    population.vaccinate.fail = 0.0;
    let config = SimulationConfig {
        virus: VirusConfig {
            death_odds: 0.0,
            vaccine_schedule: VaccineSchedule::Never,
            ..VirusConfig::default()
        },
        population,
        government: GovernmentConfig::default(),
    };
    let mut simulation = VirusSimulation::new(&config, 5).unwrap();
    simulation.government_mut().set_mandates(true, true, true);
    let initial = simulation.population().vaccinated();
    assert!(initial > 0);

    let history = simulation.run(60).unwrap();
    assert!(history.iter().all(|stats| stats.vaccinated == initial));
    assert!(history.iter().all(|stats| stats.not_fully_vaccinated == 0));
}

#[test]
fn custom_vaccine_availability_enables_vaccination() {
    let mut population = no_interventions(300, 30, 0.05);
    population.vaccinate.threshold = 0.0;
    population.vaccinate.fail = 0.0;
    let config = SimulationConfig {
        virus: VirusConfig {
            recovery_odds: 0.0,
            death_odds: 0.0,
            vaccine_activation_delay: 2,
            ..VirusConfig::default()
        },
        population,
        government: GovernmentConfig::default(),
    };
    let built = VirusSimulation::new(&config, 8).unwrap();
    let virus = built.virus().clone().with_vaccine_availability(|day| day >= 1);
    let mut simulation = VirusSimulation::from_parts(
        virus,
        built.population().clone(),
        built.government().clone(),
        8,
    );

    simulation.step().unwrap();
    assert_eq!(simulation.population().not_fully_vaccinated(), 0);
    simulation.step().unwrap();
    assert!(simulation.population().not_fully_vaccinated() > 0);
}

#[test]
fn counts_are_conserved_every_day() {
    let config = SimulationConfig {
        virus: VirusConfig {
            death_odds: 0.05,
            recovery_odds: 0.2,
            incubation_period: 2,
            vaccine_schedule: VaccineSchedule::FromDay(3),
            ..VirusConfig::default()
        },
        population: PopulationConfig {
            size: 500,
            initial_infected: 10,
            connection_odds: 0.02,
            ..PopulationConfig::default()
        },
        government: GovernmentConfig::default(),
    };
    let mut simulation = VirusSimulation::new(&config, 99).unwrap();
    let history = simulation.run(200).unwrap();
    for stats in &history {
        assert_eq!(
            stats.healthy + stats.infected + stats.sick + stats.recovered + stats.dead,
            500,
            "{stats:?}"
        );
        assert_eq!(stats.alive + stats.dead, 500);
    }
    assert!(history.windows(2).all(|w| w[1].dead >= w[0].dead));
    assert!(history.windows(2).all(|w| w[1].day == w[0].day + 1));
}

#[test]
fn same_seed_gives_identical_daily_counts() {
    let config = SimulationConfig {
        virus: VirusConfig {
            death_odds: 0.02,
            recovery_odds: 0.15,
            incubation_period: 3,
            vaccine_schedule: VaccineSchedule::FromDay(5),
            ..VirusConfig::default()
        },
        population: PopulationConfig {
            size: 400,
            initial_infected: 8,
            connection_odds: 0.03,
            ..PopulationConfig::default()
        },
        government: GovernmentConfig::default(),
    };
    let history = |seed| VirusSimulation::new(&config, seed).unwrap().run(80).unwrap();

    let first = history(31);
    assert!(first.len() > 2);
    assert_eq!(first, history(31));
    assert_ne!(first, history(32));
}

#[test]
fn infection_spreads_one_hop_per_day() {
    let size = 12;
    let mut graph = ContactGraph::with_nodes(size);
    for i in 1..size {
        graph.add_edge(PersonId::new(i - 1), PersonId::new(i)).unwrap();
    }
    let people = vec![Person::new(false, false); size];
    let mut population =
        Population::from_parts(no_interventions(0, 0, 0.0), people, graph).unwrap();
    population.infect(PersonId::new(0), 0).unwrap();

    let mut simulation = VirusSimulation::from_parts(
        VirusProfile::new(&certain_virus()).unwrap(),
        population,
        Government::new(GovernmentConfig::default()).unwrap(),
        1,
    );
    for day in 1..size {
        assert!(simulation.step().unwrap());
        let reached: Vec<usize> = simulation
            .population()
            .people()
            .filter(|(_, person)| person.status() != InfectionStatus::Healthy)
            .map(|(id, _)| id.index())
            .collect();
        assert_eq!(reached, (0..=day).collect::<Vec<_>>(), "day {day}");
    }
}

#[test]
fn countdowns_never_increase_without_new_course() {
    let mut population = no_interventions(200, 5, 0.05);
    population.vaccinate.threshold = 0.0;
    population.vaccinate.fail = 0.5;
    let config = SimulationConfig {
        virus: VirusConfig {
            incubation_period: 4,
            vaccine_activation_delay: 5,
            vaccine_schedule: VaccineSchedule::Always,
            ..VirusConfig::default()
        },
        population,
        government: GovernmentConfig::default(),
    };
    let mut simulation = VirusSimulation::new(&config, 17).unwrap();
    let snapshot = |s: &VirusSimulation| {
        s.population()
            .people()
            .map(|(id, p)| (id, p.status(), p.incubation_countdown(), p.vaccine_countdown()))
            .collect::<Vec<_>>()
    };
    let mut before = snapshot(&simulation);
    for _ in 0..30 {
        if !simulation.step().unwrap() {
            break;
        }
        let after = snapshot(&simulation);
        for (id, status, incubation, vaccine) in &after {
            let Some(old) = before.iter().find(|(old_id, ..)| old_id == id) else {
                continue;
            };
            let newly_infected =
                old.1 != InfectionStatus::Infected && *status == InfectionStatus::Infected;
            if !newly_infected {
                assert!(*incubation <= old.2, "{id} incubation grew");
            }
            // A course can only start from a zero countdown.
            if old.3 > 0 {
                assert!(*vaccine < old.3, "{id} vaccine countdown did not advance");
            }
        }
        before = after;
    }
}
