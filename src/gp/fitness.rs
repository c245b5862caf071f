//! Fitness evaluation and population statistics.
//!
//! Fitness is a cost: lower values are better. Evaluation of a generation is
//! spread over the rayon thread pool; each tree is scored by exactly one
//! worker against a shared, read-only context.

// Statistics use intentional casts
#![allow(clippy::cast_precision_loss)]

use rayon::prelude::*;

use crate::gp::selection::sort_indices;
use crate::tree::Tree;

/// Scores one tree against a context.
pub trait Fitness<V, C>: Sync {
    /// Cost of `tree`; lower is better.
    fn fitness(&self, tree: &Tree<V>, ctx: &C) -> f64;
}

impl<V, C, F> Fitness<V, C> for F
where
    F: Fn(&Tree<V>, &C) -> f64 + Sync,
{
    fn fitness(&self, tree: &Tree<V>, ctx: &C) -> f64 {
        self(tree, ctx)
    }
}

/// Score every individual in parallel.
///
/// Returns fitness values in the same order as the population.
#[must_use]
pub fn evaluate_population<V, C, F>(population: &[Tree<V>], fitness: &F, ctx: &C) -> Vec<f64>
where
    V: Sync,
    C: Sync,
    F: Fitness<V, C> + ?Sized,
{
    population
        .par_iter()
        .map(|tree| fitness.fitness(tree, ctx))
        .collect()
}

/// Summary of one scored population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// Index of the best individual.
    pub best_index: usize,
    /// Lowest cost.
    pub best_fitness: f64,
    /// Highest cost.
    pub worst_fitness: f64,
    /// Mean cost.
    pub mean_fitness: f64,
    /// Standard deviation of cost.
    pub fitness_std: f64,
    /// Mean tree height.
    pub mean_height: f64,
    /// Mean node count.
    pub mean_size: f64,
}

impl PopulationStats {
    /// Compute statistics; `None` for an empty population.
    ///
    /// # Panics
    ///
    /// Panics if `population` and `fitness` differ in length.
    #[must_use]
    pub fn compute<V>(population: &[Tree<V>], fitness: &[f64]) -> Option<Self> {
        assert_eq!(
            population.len(),
            fitness.len(),
            "population and fitness sizes differ"
        );
        let order = sort_indices(fitness);
        let (&best_index, &worst_index) = (order.first()?, order.last()?);

        let n = fitness.len() as f64;
        let mean = fitness.iter().sum::<f64>() / n;
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            best_index,
            best_fitness: fitness[best_index],
            worst_fitness: fitness[worst_index],
            mean_fitness: mean,
            fitness_std: variance.sqrt(),
            mean_height: population.iter().map(|t| t.height() as f64).sum::<f64>() / n,
            mean_size: population.iter().map(|t| t.len() as f64).sum::<f64>() / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> Tree<u32> {
        let mut t = Tree::new();
        let mut pos = t.root();
        for i in 0..len {
            pos = t.insert_below(pos, u32::try_from(i).unwrap()).unwrap();
        }
        t
    }

    #[test]
    fn test_closure_fitness() {
        let population: Vec<_> = (1..=4).map(chain).collect();
        let size_cost = |t: &Tree<u32>, weight: &f64| t.len() as f64 * weight;
        let fitness = evaluate_population(&population, &size_cost, &0.5);
        assert_eq!(fitness, vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_population_stats() {
        let population: Vec<_> = [3, 1, 2].into_iter().map(chain).collect();
        let fitness = vec![2.0, 4.0, 0.0];
        let stats = PopulationStats::compute(&population, &fitness).unwrap();
        assert_eq!(stats.best_index, 2);
        assert!((stats.best_fitness - 0.0).abs() < 1e-12);
        assert!((stats.worst_fitness - 4.0).abs() < 1e-12);
        assert!((stats.mean_fitness - 2.0).abs() < 1e-12);
        assert!((stats.fitness_std - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((stats.mean_height - 2.0).abs() < 1e-12);
        assert!((stats.mean_size - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_population_stats() {
        let population: Vec<Tree<u32>> = Vec::new();
        assert!(PopulationStats::compute(&population, &[]).is_none());
    }

    #[test]
    #[should_panic(expected = "sizes differ")]
    fn test_mismatched_sizes_panic() {
        let population = vec![chain(1)];
        let _ = PopulationStats::compute(&population, &[1.0, 2.0]);
    }
}
