//! Crossover operators for genetic programming.
//!
//! One-point crossover exchanges a subtree of one parent with a subtree of
//! the other. Candidate pairs are drawn until one keeps both offspring within
//! the height budget; if the iteration budget runs out, the parents are left
//! untouched and the attempt reports failure.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, GpError, GpResult};
use crate::tree::{Cursor, Tree, cursor_equal};

/// Configuration for crossover operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverConfig {
    /// Maximum height of either offspring.
    pub max_height: usize,
    /// Candidate pairs tried before giving up.
    pub max_iterations: usize,
    /// Probability of choosing an internal node as crossover point; `None`
    /// draws points uniformly over all nodes.
    pub internal_point_rate: Option<f64>,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            max_height: 17,
            max_iterations: 100,
            internal_point_rate: Some(0.9),
        }
    }
}

/// Recombines two trees in place.
pub trait CrossoverStrategy<V> {
    /// Exchange material between `t1` and `t2`. Returns `false`, leaving both
    /// untouched, when no admissible pair was found.
    fn crossover<R: Rng>(&self, t1: &mut Tree<V>, t2: &mut Tree<V>, rng: &mut R) -> bool;
}

/// Height-bounded subtree exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnePointCrossover {
    max_height: usize,
    max_iterations: usize,
    internal_point_rate: Option<f64>,
}

impl OnePointCrossover {
    /// Uniform point choice.
    #[must_use]
    pub const fn new(max_height: usize, max_iterations: usize) -> Self {
        Self {
            max_height,
            max_iterations,
            internal_point_rate: None,
        }
    }

    /// Prefer internal nodes with probability `rate`, leaves otherwise.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if `rate` is not within `[0, 1]`.
    pub fn with_internal_point_rate(mut self, rate: f64) -> GpResult<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Invalid(format!(
                "internal point rate {rate} is outside [0, 1]"
            ))
            .into());
        }
        self.internal_point_rate = Some(rate);
        Ok(self)
    }

    /// Maximum offspring height.
    #[must_use]
    pub const fn max_height(&self) -> usize {
        self.max_height
    }
}

impl TryFrom<&CrossoverConfig> for OnePointCrossover {
    type Error = GpError;

    fn try_from(config: &CrossoverConfig) -> GpResult<Self> {
        let op = Self::new(config.max_height, config.max_iterations);
        match config.internal_point_rate {
            Some(rate) => op.with_internal_point_rate(rate),
            None => Ok(op),
        }
    }
}

/// Crossover points of one parent split by kind.
struct Points {
    internal: Vec<Cursor>,
    leaves: Vec<Cursor>,
}

impl Points {
    fn of<V>(tree: &Tree<V>) -> Self {
        let (internal, leaves) = tree.preorder().partition::<Vec<_>, _>(|c| c.size() > 0);
        Self {
            internal: internal.into_iter().map(|c| c.cursor()).collect(),
            leaves: leaves.into_iter().map(|c| c.cursor()).collect(),
        }
    }

    fn pick<R: Rng>(&self, rate: f64, rng: &mut R) -> Cursor {
        let pool = if rng.gen_bool(rate) && !self.internal.is_empty() {
            &self.internal
        } else {
            &self.leaves
        };
        pool[rng.gen_range(0..pool.len())]
    }
}

impl OnePointCrossover {
    fn pick<V, R: Rng>(&self, tree: &Tree<V>, points: Option<&Points>, rng: &mut R) -> Cursor {
        match (self.internal_point_rate, points) {
            (Some(rate), Some(points)) => points.pick(rate, rng),
            _ => tree.rank_is(rng.gen_range(0..tree.len())),
        }
    }
}

impl<V: PartialEq> CrossoverStrategy<V> for OnePointCrossover {
    fn crossover<R: Rng>(&self, t1: &mut Tree<V>, t2: &mut Tree<V>, rng: &mut R) -> bool {
        if t1.is_empty() || t2.is_empty() {
            return false;
        }
        let (p1, p2) = match self.internal_point_rate {
            Some(_) => (Some(Points::of(t1)), Some(Points::of(t2))),
            None => (None, None),
        };

        for _ in 0..self.max_iterations {
            let c1 = self.pick(t1, p1.as_ref(), rng);
            let c2 = self.pick(t2, p2.as_ref(), rng);
            let (n1, n2) = (t1.at(c1), t2.at(c2));

            if cursor_equal(n1, n2) {
                continue;
            }
            if n1.level() + n2.height() > self.max_height
                || n2.level() + n1.height() > self.max_height
            {
                continue;
            }
            if t1.swap_subtrees(c1, t2, c2).is_ok() {
                return true;
            }
        }

        debug!(
            iterations = self.max_iterations,
            max_height = self.max_height,
            "crossover found no admissible pair"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::generate::{BasicGenerator, RampGenerator, TreeGenerator};
    use crate::gp::symbol::{NodeGenerator, SymbolClass};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn table() -> NodeGenerator<char> {
        NodeGenerator::new(vec![
            SymbolClass::new(0, vec!['x', 'y', 'z']),
            SymbolClass::new(1, vec!['s', 'c']),
            SymbolClass::new(2, vec!['+', '-', '*']),
        ])
        .unwrap()
    }

    #[test]
    fn test_crossover_respects_height_bound() {
        let mut rng = SmallRng::seed_from_u64(42);
        let g = RampGenerator::new(table(), 1, 6, 0.5).unwrap();
        for rate in [None, Some(0.9)] {
            let mut op = OnePointCrossover::new(6, 100);
            if let Some(rate) = rate {
                op = op.with_internal_point_rate(rate).unwrap();
            }
            for _ in 0..300 {
                let mut t1 = g.generate(&mut rng);
                let mut t2 = g.generate(&mut rng);
                let total = t1.len() + t2.len();
                op.crossover(&mut t1, &mut t2, &mut rng);
                assert!(t1.height() <= 6);
                assert!(t2.height() <= 6);
                assert_eq!(t1.len() + t2.len(), total);
            }
        }
    }

    #[test]
    fn test_crossover_changes_trees() {
        let mut rng = SmallRng::seed_from_u64(7);
        let g = BasicGenerator::new(table(), 3, 3).unwrap();
        let op = OnePointCrossover::new(10, 100);
        let mut changed = 0;
        for _ in 0..50 {
            let mut t1 = g.generate(&mut rng);
            let mut t2 = g.generate(&mut rng);
            let (before1, before2) = (t1.clone(), t2.clone());
            if op.crossover(&mut t1, &mut t2, &mut rng) {
                assert!(t1 != before1 || t2 != before2);
                changed += 1;
            }
        }
        assert!(changed > 40);
    }

    #[test]
    fn test_identical_leaves_never_cross() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut t1 = Tree::new();
        t1.insert_below(t1.root(), 'x').unwrap();
        let mut t2 = t1.clone();
        let op = OnePointCrossover::new(5, 20);
        assert!(!op.crossover(&mut t1, &mut t2, &mut rng));
        assert_eq!(t1.len(), 1);
    }

    #[test]
    fn test_empty_parent_fails() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut t1 = Tree::new();
        t1.insert_below(t1.root(), 'x').unwrap();
        let mut t2 = Tree::new();
        assert!(!OnePointCrossover::new(5, 20).crossover(&mut t1, &mut t2, &mut rng));
    }

    #[test]
    fn test_tight_budget_gives_up() {
        let mut rng = SmallRng::seed_from_u64(3);
        let g = BasicGenerator::new(table(), 4, 4).unwrap();
        let mut t1 = g.generate(&mut rng);
        let mut t2 = g.generate(&mut rng);
        let (before1, before2) = (t1.clone(), t2.clone());
        // Full trees of height 4 never fit under 3.
        assert!(!OnePointCrossover::new(3, 50).crossover(&mut t1, &mut t2, &mut rng));
        assert_eq!(t1, before1);
        assert_eq!(t2, before2);
    }

    #[test]
    fn test_config_conversion() {
        let config = CrossoverConfig::default();
        let op = OnePointCrossover::try_from(&config).unwrap();
        assert_eq!(op.max_height(), 17);
    }

    #[test]
    fn test_out_of_range_point_rate_rejected() {
        for rate in [1.5, -0.1, f64::NAN] {
            let err = OnePointCrossover::new(10, 10)
                .with_internal_point_rate(rate)
                .unwrap_err();
            assert!(matches!(err, GpError::Config(ConfigError::Invalid(_))));

            let config = CrossoverConfig {
                internal_point_rate: Some(rate),
                ..CrossoverConfig::default()
            };
            assert!(OnePointCrossover::try_from(&config).is_err());
        }
        assert!(OnePointCrossover::new(10, 10).with_internal_point_rate(1.0).is_ok());
    }
}
