//! Mutation operators for genetic programming.
//!
//! Point mutation regrows the subtree at a random node. Simple mutation only
//! swaps a node's symbol for another one of the same arity. Both report
//! whether they changed the tree; a `false` outcome leaves it untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gp::generate::TreeGenerator;
use crate::gp::symbol::NodeGenerator;
use crate::tree::Tree;

/// Configuration for mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Maximum height of a mutated tree.
    pub max_height: usize,
    /// Regrowth attempts before giving up.
    pub max_trials: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            max_height: 17,
            max_trials: 20,
        }
    }
}

/// Changes one tree in place.
pub trait Mutator<V> {
    /// Mutate `tree`. Returns `false`, leaving it untouched, when no
    /// admissible change was found.
    fn mutate<R: Rng>(&self, tree: &mut Tree<V>, rng: &mut R) -> bool;
}

/// Replace a random subtree with a freshly generated one.
#[derive(Debug, Clone)]
pub struct PointMutation<G> {
    generator: G,
    max_height: usize,
    max_trials: usize,
}

impl<G> PointMutation<G> {
    /// Regrow subtrees with `generator`, keeping trees within `max_height`.
    #[must_use]
    pub const fn new(generator: G, max_height: usize, max_trials: usize) -> Self {
        Self {
            generator,
            max_height,
            max_trials,
        }
    }

    /// Build from configuration.
    #[must_use]
    pub const fn from_config(generator: G, config: &MutationConfig) -> Self {
        Self::new(generator, config.max_height, config.max_trials)
    }
}

impl<V, G> Mutator<V> for PointMutation<G>
where
    V: Clone,
    G: TreeGenerator<V>,
{
    fn mutate<R: Rng>(&self, tree: &mut Tree<V>, rng: &mut R) -> bool {
        if tree.is_empty() {
            return false;
        }

        for _ in 0..self.max_trials {
            let pos = tree.rank_is(rng.gen_range(0..tree.len()));
            let level = tree.at(pos).level();
            let fresh = self.generator.generate(rng);
            if level + fresh.height() > self.max_height {
                continue;
            }
            if tree.assign(pos, fresh.croot()).is_ok() {
                return true;
            }
        }

        debug!(
            trials = self.max_trials,
            max_height = self.max_height,
            "point mutation found no admissible subtree"
        );
        false
    }
}

/// Replace one node's symbol with another of the same arity.
#[derive(Debug, Clone)]
pub struct SimpleMutation<V> {
    nodes: NodeGenerator<V>,
}

impl<V> SimpleMutation<V> {
    /// Draw replacement symbols from `nodes`.
    #[must_use]
    pub const fn new(nodes: NodeGenerator<V>) -> Self {
        Self { nodes }
    }
}

impl<V: Clone> Mutator<V> for SimpleMutation<V> {
    fn mutate<R: Rng>(&self, tree: &mut Tree<V>, rng: &mut R) -> bool {
        if tree.is_empty() {
            return false;
        }
        let pos = tree.rank_is(rng.gen_range(0..tree.len()));
        let arity = tree.at(pos).size();
        match (self.nodes.random_with_arity(arity, rng), tree.get_mut(pos)) {
            (Some(symbol), Some(slot)) => {
                *slot = symbol;
                true
            }
            _ => false,
        }
    }
}
