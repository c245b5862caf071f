//! Generational pipeline and the main evolution loop.
//!
//! One generation copies the best `number_elite` individuals, then fills the
//! rest of the population by repeatedly drawing one of mutation, crossover or
//! reproduction with probability proportional to its rate. Each operator picks
//! its own parents through its selector.

// Evolution uses intentional casts and long generic signatures
#![allow(clippy::cast_precision_loss, clippy::too_many_arguments)]

use std::time::Instant;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::error::{ConfigError, GpResult};
use crate::gp::config::EvolutionConfig;
use crate::gp::crossover::CrossoverStrategy;
use crate::gp::fitness::{Fitness, PopulationStats, evaluate_population};
use crate::gp::mutation::Mutator;
use crate::gp::selection::{Selector, best_individuals, better};
use crate::tree::Tree;

/// Configuration for the generational pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Individuals copied unchanged into the next generation.
    pub number_elite: usize,
    /// Relative weight of mutation.
    pub mutation_rate: f64,
    /// Relative weight of crossover.
    pub crossover_rate: f64,
    /// Relative weight of reproduction.
    pub reproduction_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            number_elite: 1,
            mutation_rate: 0.3,
            crossover_rate: 0.6,
            reproduction_rate: 0.1,
        }
    }
}

/// Produces offspring from a scored population.
pub trait Breeder<V> {
    /// Offspring built from individuals chosen out of `population`.
    fn breed<R: Rng>(&self, population: &[Tree<V>], fitness: &[f64], rng: &mut R) -> Vec<Tree<V>>;
}

/// One mutated copy of a selected individual.
#[derive(Debug, Clone)]
pub struct MutationOp<M, S> {
    mutator: M,
    selector: S,
}

impl<M, S> MutationOp<M, S> {
    /// Pair a mutation strategy with a selector.
    #[must_use]
    pub const fn new(mutator: M, selector: S) -> Self {
        Self { mutator, selector }
    }
}

impl<V, M, S> Breeder<V> for MutationOp<M, S>
where
    V: Clone,
    M: Mutator<V>,
    S: Selector,
{
    fn breed<R: Rng>(&self, population: &[Tree<V>], fitness: &[f64], rng: &mut R) -> Vec<Tree<V>> {
        let parent = self.selector.select(fitness, rng);
        let mut child = population[parent].clone();
        if !self.mutator.mutate(&mut child, rng) {
            trace!(parent, "mutation left the individual unchanged");
        }
        vec![child]
    }
}

/// Two recombined copies of two selected individuals.
///
/// If the crossover gives up, the unchanged copies are returned.
#[derive(Debug, Clone)]
pub struct CrossoverOp<X, S> {
    strategy: X,
    selector: S,
}

impl<X, S> CrossoverOp<X, S> {
    /// Pair a crossover strategy with a selector.
    #[must_use]
    pub const fn new(strategy: X, selector: S) -> Self {
        Self { strategy, selector }
    }
}

impl<V, X, S> Breeder<V> for CrossoverOp<X, S>
where
    V: Clone,
    X: CrossoverStrategy<V>,
    S: Selector,
{
    fn breed<R: Rng>(&self, population: &[Tree<V>], fitness: &[f64], rng: &mut R) -> Vec<Tree<V>> {
        let first = self.selector.select(fitness, rng);
        let second = self.selector.select(fitness, rng);
        let mut a = population[first].clone();
        let mut b = population[second].clone();
        if !self.strategy.crossover(&mut a, &mut b, rng) {
            trace!(first, second, "crossover fell back to reproduction");
        }
        vec![a, b]
    }
}

/// A verbatim copy of a selected individual.
#[derive(Debug, Clone)]
pub struct ReproductionOp<S> {
    selector: S,
}

impl<S> ReproductionOp<S> {
    /// Copy individuals chosen by `selector`.
    #[must_use]
    pub const fn new(selector: S) -> Self {
        Self { selector }
    }
}

impl<V: Clone, S: Selector> Breeder<V> for ReproductionOp<S> {
    fn breed<R: Rng>(&self, population: &[Tree<V>], fitness: &[f64], rng: &mut R) -> Vec<Tree<V>> {
        vec![population[self.selector.select(fitness, rng)].clone()]
    }
}

/// Elitism plus weighted dispatch over three breeders.
#[derive(Debug, Clone)]
pub struct StaticPipeline<M, X, P> {
    number_elite: usize,
    mutation: M,
    crossover: X,
    reproduction: P,
    dispatch: WeightedIndex<f64>,
}

impl<M, X, P> StaticPipeline<M, X, P> {
    /// Build a pipeline from its configuration and operators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a rate is negative or not finite,
    /// or if all rates are zero.
    pub fn new(config: &PipelineConfig, mutation: M, crossover: X, reproduction: P) -> GpResult<Self> {
        let rates = [
            config.mutation_rate,
            config.crossover_rate,
            config.reproduction_rate,
        ];
        let dispatch = WeightedIndex::new(rates)
            .map_err(|e| ConfigError::Invalid(format!("operator rates {rates:?}: {e}")))?;
        Ok(Self {
            number_elite: config.number_elite,
            mutation,
            crossover,
            reproduction,
            dispatch,
        })
    }

    /// Replace `population` with the next generation of the same size.
    ///
    /// # Panics
    ///
    /// Panics if `population` and `fitness` differ in length, or if an
    /// operator breeds no offspring.
    pub fn next_generation<V, R>(&self, population: &mut Vec<Tree<V>>, fitness: &[f64], rng: &mut R)
    where
        V: Clone,
        M: Breeder<V>,
        X: Breeder<V>,
        P: Breeder<V>,
        R: Rng,
    {
        assert_eq!(
            population.len(),
            fitness.len(),
            "population and fitness sizes differ"
        );
        let target = population.len();
        let mut next = Vec::with_capacity(target);

        for idx in best_individuals(fitness, self.number_elite.min(target)) {
            next.push(population[idx].clone());
        }

        while next.len() < target {
            let offspring = match self.dispatch.sample(rng) {
                0 => self.mutation.breed(population, fitness, rng),
                1 => self.crossover.breed(population, fitness, rng),
                _ => self.reproduction.breed(population, fitness, rng),
            };
            assert!(!offspring.is_empty(), "breeder produced no offspring");
            let room = target - next.len();
            next.extend(offspring.into_iter().take(room));
        }

        *population = next;
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Generation number, starting at 0.
    pub generation: usize,
    /// Population summary.
    pub stats: PopulationStats,
}

/// Result of an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome<V> {
    /// Best individual seen in any generation.
    pub best: Tree<V>,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generation where it was found.
    pub best_generation: usize,
    /// Statistics per generation.
    pub generations: Vec<GenerationStats>,
    /// Total time in seconds.
    pub elapsed_seconds: f64,
}

/// Run the evolution loop.
///
/// Each generation is scored with `fitness` against `context`; every
/// generation after the first is bred from the previous one by `pipeline`.
/// The run stops after `config.max_generations` generations, or earlier once
/// the best fitness reaches `config.target_fitness`. `on_generation` sees the
/// statistics of each generation as it completes.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the initial population is empty.
pub fn evolve<V, C, F, M, X, P, R>(
    mut population: Vec<Tree<V>>,
    fitness: &F,
    context: &C,
    pipeline: &StaticPipeline<M, X, P>,
    config: &EvolutionConfig,
    rng: &mut R,
    mut on_generation: impl FnMut(&GenerationStats),
) -> GpResult<EvolutionOutcome<V>>
where
    V: Clone + Sync,
    C: Sync,
    F: Fitness<V, C> + ?Sized,
    M: Breeder<V>,
    X: Breeder<V>,
    P: Breeder<V>,
    R: Rng,
{
    let start_time = Instant::now();
    let max_generations = config.max_generations.max(1);

    let mut best: Option<(Tree<V>, f64, usize)> = None;
    let mut history = Vec::with_capacity(max_generations);
    let mut scores: Vec<f64> = Vec::new();

    for generation in 0..max_generations {
        if generation > 0 {
            pipeline.next_generation(&mut population, &scores, rng);
        }
        scores = evaluate_population(&population, fitness, context);

        let Some(stats) = PopulationStats::compute(&population, &scores) else {
            return Err(ConfigError::Invalid("population is empty".to_string()).into());
        };

        let improved = best
            .as_ref()
            .is_none_or(|(_, best_fitness, _)| better(stats.best_fitness, *best_fitness));
        if improved {
            best = Some((
                population[stats.best_index].clone(),
                stats.best_fitness,
                generation,
            ));
        }

        info!(
            generation,
            best = stats.best_fitness,
            mean = stats.mean_fitness,
            std = stats.fitness_std,
            mean_size = stats.mean_size,
            "generation complete"
        );

        let record = GenerationStats { generation, stats };
        on_generation(&record);
        history.push(record);

        let reached = config
            .target_fitness
            .is_some_and(|target| best.as_ref().is_some_and(|(_, f, _)| *f <= target));
        if reached {
            break;
        }
    }

    let Some((best, best_fitness, best_generation)) = best else {
        return Err(ConfigError::Invalid("population is empty".to_string()).into());
    };

    Ok(EvolutionOutcome {
        best,
        best_fitness,
        best_generation,
        generations: history,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::crossover::OnePointCrossover;
    use crate::gp::generate::{BasicGenerator, RampGenerator, TreeGenerator, seed_population};
    use crate::gp::mutation::PointMutation;
    use crate::gp::selection::TournamentSelector;
    use crate::gp::symbol::{NodeGenerator, SymbolClass};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn table() -> NodeGenerator<char> {
        NodeGenerator::new(vec![
            SymbolClass::new(0, vec!['x', 'y']),
            SymbolClass::new(1, vec!['s']),
            SymbolClass::new(2, vec!['+', '*']),
        ])
        .unwrap()
    }

    type Pipeline = StaticPipeline<
        MutationOp<PointMutation<BasicGenerator<char>>, TournamentSelector>,
        CrossoverOp<OnePointCrossover, TournamentSelector>,
        ReproductionOp<TournamentSelector>,
    >;

    fn pipeline(config: &PipelineConfig) -> Pipeline {
        let selector = TournamentSelector::new(3);
        StaticPipeline::new(
            config,
            MutationOp::new(
                PointMutation::new(BasicGenerator::new(table(), 1, 3).unwrap(), 8, 20),
                selector,
            ),
            CrossoverOp::new(OnePointCrossover::new(8, 100), selector),
            ReproductionOp::new(selector),
        )
        .unwrap()
    }

    /// Cost: node count.
    fn size_cost(tree: &Tree<char>, _: &()) -> f64 {
        tree.len() as f64
    }

    #[test]
    fn test_next_generation_keeps_size_and_elite() {
        let mut rng = SmallRng::seed_from_u64(42);
        let g = RampGenerator::new(table(), 1, 5, 0.5).unwrap();
        let mut population = seed_population(&g, 30, &mut rng);
        let fitness = evaluate_population(&population, &size_cost, &());
        let best = population[best_individuals(&fitness, 1)[0]].clone();

        let config = PipelineConfig {
            number_elite: 2,
            ..PipelineConfig::default()
        };
        pipeline(&config).next_generation(&mut population, &fitness, &mut rng);

        assert_eq!(population.len(), 30);
        assert_eq!(population[0], best);
        assert!(population.iter().all(|t| t.height() <= 8));
    }

    #[test]
    fn test_crossover_only_truncates_odd_fill() {
        let mut rng = SmallRng::seed_from_u64(1);
        let g = BasicGenerator::new(table(), 2, 3).unwrap();
        let mut population = seed_population(&g, 7, &mut rng);
        let fitness = evaluate_population(&population, &size_cost, &());
        let config = PipelineConfig {
            number_elite: 0,
            mutation_rate: 0.0,
            crossover_rate: 1.0,
            reproduction_rate: 0.0,
        };
        pipeline(&config).next_generation(&mut population, &fitness, &mut rng);
        assert_eq!(population.len(), 7);
    }

    #[test]
    fn test_elites_clamped_to_population() {
        let mut rng = SmallRng::seed_from_u64(1);
        let g = BasicGenerator::new(table(), 1, 3).unwrap();
        let mut population = seed_population(&g, 3, &mut rng);
        let fitness = evaluate_population(&population, &size_cost, &());
        let before = population.clone();
        let config = PipelineConfig {
            number_elite: 10,
            ..PipelineConfig::default()
        };
        pipeline(&config).next_generation(&mut population, &fitness, &mut rng);
        assert_eq!(population.len(), 3);
        for tree in &population {
            assert!(before.contains(tree));
        }
    }

    #[test]
    fn test_invalid_rates() {
        let config = PipelineConfig {
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            reproduction_rate: 0.0,
            ..PipelineConfig::default()
        };
        let selector = TournamentSelector::new(2);
        let result = StaticPipeline::new(
            &config,
            ReproductionOp::new(selector),
            ReproductionOp::new(selector),
            ReproductionOp::new(selector),
        );
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "sizes differ")]
    fn test_size_mismatch_panics() {
        let mut rng = SmallRng::seed_from_u64(1);
        let g = BasicGenerator::new(table(), 1, 3).unwrap();
        let mut population = seed_population(&g, 3, &mut rng);
        pipeline(&PipelineConfig::default()).next_generation(&mut population, &[1.0], &mut rng);
    }

    /// Breeds nothing.
    struct Barren;

    impl Breeder<char> for Barren {
        fn breed<R: Rng>(&self, _: &[Tree<char>], _: &[f64], _: &mut R) -> Vec<Tree<char>> {
            Vec::new()
        }
    }

    #[test]
    #[should_panic(expected = "no offspring")]
    fn test_barren_breeder_panics() {
        let mut rng = SmallRng::seed_from_u64(1);
        let g = BasicGenerator::new(table(), 1, 3).unwrap();
        let mut population = seed_population(&g, 4, &mut rng);
        let fitness = evaluate_population(&population, &size_cost, &());
        let pipeline = StaticPipeline::new(
            &PipelineConfig {
                number_elite: 0,
                ..PipelineConfig::default()
            },
            Barren,
            Barren,
            Barren,
        )
        .unwrap();
        pipeline.next_generation(&mut population, &fitness, &mut rng);
    }

    #[test]
    fn test_evolve_minimizes_size() {
        let mut rng = SmallRng::seed_from_u64(5);
        let g = BasicGenerator::new(table(), 3, 4).unwrap();
        let population: Vec<_> = (0..40).map(|_| g.generate(&mut rng)).collect();
        let config = EvolutionConfig {
            max_generations: 15,
            target_fitness: Some(1.0),
            ..EvolutionConfig::default()
        };
        let mut seen = 0;
        let outcome = evolve(
            population,
            &size_cost,
            &(),
            &pipeline(&PipelineConfig::default()),
            &config,
            &mut rng,
            |_| seen += 1,
        )
        .unwrap();

        assert_eq!(seen, outcome.generations.len());
        assert!(outcome.generations.len() <= 15);
        assert!((outcome.best_fitness - outcome.best.len() as f64).abs() < 1e-12);
        let first = outcome.generations[0].stats.best_fitness;
        assert!(outcome.best_fitness <= first);
    }

    #[test]
    fn test_evolve_rejects_empty_population() {
        let mut rng = SmallRng::seed_from_u64(5);
        let result = evolve(
            Vec::new(),
            &size_cost,
            &(),
            &pipeline(&PipelineConfig::default()),
            &EvolutionConfig::default(),
            &mut rng,
            |_| {},
        );
        assert!(result.is_err());
    }
}
