//! Selection operators for genetic programming.
//!
//! Fitness is a cost throughout: lower is better. Selectors look only at the
//! fitness slice, whose indices run parallel to the population. NaN fitness
//! ranks below every number.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for selection operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of individuals competing in each tournament.
    pub tournament_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { tournament_size: 4 }
    }
}

/// Picks one individual by index.
pub trait Selector {
    /// Index of the chosen individual.
    ///
    /// # Panics
    ///
    /// Implementations panic on an empty fitness slice.
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize;
}

/// Best of `size` uniformly drawn individuals, with replacement.
///
/// When `size` covers the whole population, every member competes and the
/// first global minimum wins, independent of the random generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentSelector {
    size: usize,
}

impl TournamentSelector {
    /// A tournament of `size` entrants; 0 is treated as 1.
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of entrants per tournament.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

impl From<&SelectionConfig> for TournamentSelector {
    fn from(config: &SelectionConfig) -> Self {
        Self::new(config.tournament_size)
    }
}

impl Selector for TournamentSelector {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        let n = fitness.len();
        assert!(n > 0, "cannot select from an empty population");

        if self.size >= n {
            return (1..n).fold(0, |best, i| {
                if better(fitness[i], fitness[best]) { i } else { best }
            });
        }

        let mut best = rng.gen_range(0..n);
        for _ in 1..self.size {
            let idx = rng.gen_range(0..n);
            if better(fitness[idx], fitness[best]) {
                best = idx;
            }
        }
        best
    }
}

/// Uniform draw that ignores fitness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomSelector;

impl Selector for RandomSelector {
    fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "cannot select from an empty population");
        rng.gen_range(0..fitness.len())
    }
}

/// Strictly lower cost; NaN is never better.
pub(crate) fn better(a: f64, b: f64) -> bool {
    !a.is_nan() && (b.is_nan() || a < b)
}

/// Ascending cost order with NaN last.
fn fitness_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Indices sorted by ascending fitness; ties keep their original order.
#[must_use]
pub fn sort_indices(fitness: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..fitness.len()).collect();
    indices.sort_by(|&a, &b| fitness_order(fitness[a], fitness[b]));
    indices
}

/// Indices of the `n` best individuals, best first.
#[must_use]
pub fn best_individuals(fitness: &[f64], n: usize) -> Vec<usize> {
    let mut indices = sort_indices(fitness);
    indices.truncate(n);
    indices
}
