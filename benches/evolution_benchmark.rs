//! Benchmarks for one generation of the pipeline.
//!
//! Fitness is a cheap size cost so the numbers reflect breeding overhead.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use std::hint::black_box;

use arbor_gp::Tree;
use arbor_gp::gp::{
    CrossoverOp, EvolutionConfig, MutationOp, NodeGenerator, OnePointCrossover, PointMutation,
    ReproductionOp, StaticPipeline, SymbolClass, TournamentSelector, evaluate_population,
};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn table() -> NodeGenerator<u8> {
    NodeGenerator::new(vec![
        SymbolClass::new(0, vec![0, 1, 2]),
        SymbolClass::new(1, vec![10, 11]),
        SymbolClass::new(2, vec![20, 21, 22, 23]),
    ])
    .unwrap()
}

fn size_cost(tree: &Tree<u8>, _: &()) -> f64 {
    tree.len() as f64
}

fn bench_next_generation(c: &mut Criterion) {
    let config = EvolutionConfig::default();
    let mut rng = SmallRng::seed_from_u64(42);
    let init = config.generate.init_generator(table()).unwrap();
    let population = config
        .generate
        .seed(&init, config.population_size, &mut rng)
        .unwrap();
    let fitness = evaluate_population(&population, &size_cost, &());

    let selector = TournamentSelector::from(&config.selection);
    let subtrees = config.generate.subtree_generator(table()).unwrap();
    let pipeline = StaticPipeline::new(
        &config.pipeline,
        MutationOp::new(PointMutation::from_config(subtrees, &config.mutation), selector),
        CrossoverOp::new(OnePointCrossover::try_from(&config.crossover).unwrap(), selector),
        ReproductionOp::new(selector),
    )
    .unwrap();

    c.bench_function("next_generation_512", |b| {
        b.iter_batched(
            || population.clone(),
            |mut next| {
                pipeline.next_generation(&mut next, &fitness, &mut rng);
                black_box(next)
            },
            BatchSize::LargeInput,
        );
    });

    c.bench_function("evaluate_population_512", |b| {
        b.iter(|| black_box(evaluate_population(&population, &size_cost, &())));
    });
}

criterion_group!(benches, bench_next_generation);
criterion_main!(benches);
