use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use virus_sim::{SimulationConfig, VirusSimulation};

const SEED: u64 = 42;

fn config(size: usize) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.population.size = size;
    config.population.initial_infected = size / 100;
    // Roughly ten contacts per person.
    config.population.connection_odds = 10.0 / size as f64;
    config
}

pub fn criterion_benchmark(criterion: &mut Criterion) {
    let mut criterion = criterion.benchmark_group("simulation_step");

    for size in [1_000, 10_000] {
        let config = config(size);

        criterion.bench_function(format!("setup_{size}"), |bencher| {
            bencher.iter(|| black_box(VirusSimulation::new(black_box(&config), SEED).unwrap()));
        });

        criterion.bench_function(format!("first_day_{size}"), |bencher| {
            bencher.iter_batched(
                || VirusSimulation::new(&config, SEED).unwrap(),
                |mut simulation| black_box(simulation.step().unwrap()),
                BatchSize::LargeInput,
            );
        });

        criterion.bench_function(format!("thirty_days_{size}"), |bencher| {
            bencher.iter_batched(
                || VirusSimulation::new(&config, SEED).unwrap(),
                |mut simulation| black_box(simulation.run(30).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }

    criterion.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
