//! Random tree generation and population seeding.
//!
//! Generators decide, level by level, whether a position becomes a
//! non-terminal or a terminal:
//!
//! - below `min_height - 1` the node must be a non-terminal,
//! - at `max_height - 1` it must be a terminal,
//! - in between it is drawn from the weighted table of all classes.
//!
//! With `min_height == max_height` this produces full trees whose leaves all
//! sit at level `max_height - 1`.

use std::collections::HashSet;
use std::hash::Hash;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GpError, GpResult};
use crate::gp::symbol::NodeGenerator;
use crate::tree::{Link, Tree};

/// Configuration for tree generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Minimum height of generated trees.
    pub min_height: usize,
    /// Maximum height of subtrees grown by mutation.
    pub max_height: usize,
    /// Maximum height of individuals in the initial population.
    pub init_max_height: usize,
    /// Probability that the ramped generator grows a full tree.
    pub full_probability: f64,
    /// Require structurally distinct individuals in the initial population.
    pub unique_population: bool,
    /// Seeding attempts allowed per requested individual.
    pub collision_factor: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            min_height: 1,
            max_height: 4,
            init_max_height: 6,
            full_probability: 0.5,
            unique_population: true,
            collision_factor: 3,
        }
    }
}

impl GenerateConfig {
    /// Ramped generator for the initial population.
    ///
    /// # Errors
    ///
    /// See [`RampGenerator::new`].
    pub fn init_generator<V: Clone>(&self, nodes: NodeGenerator<V>) -> GpResult<RampGenerator<V>> {
        RampGenerator::new(
            nodes,
            self.min_height,
            self.init_max_height,
            self.full_probability,
        )
    }

    /// Generator for subtrees regrown by mutation.
    ///
    /// # Errors
    ///
    /// See [`BasicGenerator::new`].
    pub fn subtree_generator<V: Clone>(&self, nodes: NodeGenerator<V>) -> GpResult<BasicGenerator<V>> {
        BasicGenerator::new(nodes, self.min_height, self.max_height)
    }

    /// Seed a population, enforcing uniqueness when configured.
    ///
    /// # Errors
    ///
    /// See [`seed_unique_population`].
    pub fn seed<V, G, R>(&self, generator: &G, size: usize, rng: &mut R) -> GpResult<Vec<Tree<V>>>
    where
        V: Clone + Eq + Hash,
        G: TreeGenerator<V>,
        R: Rng,
    {
        if self.unique_population {
            seed_unique_population(generator, size, self.collision_factor, rng)
        } else {
            Ok(seed_population(generator, size, rng))
        }
    }
}

/// Something that produces random trees.
pub trait TreeGenerator<V> {
    /// Produce one tree.
    fn generate<R: Rng>(&self, rng: &mut R) -> Tree<V>;
}

/// Level-driven generator with fixed height bounds.
#[derive(Debug, Clone)]
pub struct BasicGenerator<V> {
    nodes: NodeGenerator<V>,
    min_height: usize,
    max_height: usize,
}

impl<V: Clone> BasicGenerator<V> {
    /// Create a generator for heights in `[min_height, max_height]`.
    ///
    /// # Errors
    ///
    /// Returns [`GpError::InvalidSymbolTable`] if the bounds are inverted or
    /// zero, or if `min_height > 1` but the table has no non-terminals.
    pub fn new(nodes: NodeGenerator<V>, min_height: usize, max_height: usize) -> GpResult<Self> {
        check_bounds(&nodes, min_height, max_height)?;
        Ok(Self {
            nodes,
            min_height,
            max_height,
        })
    }

    /// Height bounds `(min, max)`.
    #[must_use]
    pub const fn height_bounds(&self) -> (usize, usize) {
        (self.min_height, self.max_height)
    }
}

impl<V: Clone> TreeGenerator<V> for BasicGenerator<V> {
    fn generate<R: Rng>(&self, rng: &mut R) -> Tree<V> {
        grow(&self.nodes, self.min_height, self.max_height, rng)
    }
}

/// Ramped half-and-half generator.
///
/// Each tree gets a target height drawn uniformly from the bounds. With
/// probability `full_probability` the tree is full at that height; otherwise
/// it is grown with the target as its ceiling.
#[derive(Debug, Clone)]
pub struct RampGenerator<V> {
    nodes: NodeGenerator<V>,
    min_height: usize,
    max_height: usize,
    full_probability: f64,
}

impl<V: Clone> RampGenerator<V> {
    /// Create a ramped generator.
    ///
    /// # Errors
    ///
    /// As [`BasicGenerator::new`]; additionally if `full_probability` is not
    /// within `[0, 1]`.
    pub fn new(
        nodes: NodeGenerator<V>,
        min_height: usize,
        max_height: usize,
        full_probability: f64,
    ) -> GpResult<Self> {
        check_bounds(&nodes, min_height, max_height)?;
        if !(0.0..=1.0).contains(&full_probability) {
            return Err(GpError::InvalidSymbolTable(format!(
                "full probability {full_probability} is outside [0, 1]"
            )));
        }
        if max_height > 1 && !nodes.has_non_terminals() && full_probability > 0.0 {
            return Err(GpError::InvalidSymbolTable(
                "full trees need non-terminal symbols".to_string(),
            ));
        }
        Ok(Self {
            nodes,
            min_height,
            max_height,
            full_probability,
        })
    }
}

impl<V: Clone> TreeGenerator<V> for RampGenerator<V> {
    fn generate<R: Rng>(&self, rng: &mut R) -> Tree<V> {
        let height = rng.gen_range(self.min_height..=self.max_height);
        if rng.gen_bool(self.full_probability) {
            grow(&self.nodes, height, height, rng)
        } else {
            grow(&self.nodes, self.min_height, height, rng)
        }
    }
}

fn check_bounds<V: Clone>(nodes: &NodeGenerator<V>, min_height: usize, max_height: usize) -> GpResult<()> {
    if min_height == 0 || min_height > max_height {
        return Err(GpError::InvalidSymbolTable(format!(
            "height bounds [{min_height}, {max_height}] are invalid"
        )));
    }
    if min_height > 1 && !nodes.has_non_terminals() {
        return Err(GpError::InvalidSymbolTable(format!(
            "min height {min_height} needs non-terminal symbols"
        )));
    }
    Ok(())
}

/// Grow a tree whose height lies in `[min_height, max_height]`.
fn grow<V: Clone, R: Rng>(
    nodes: &NodeGenerator<V>,
    min_height: usize,
    max_height: usize,
    rng: &mut R,
) -> Tree<V> {
    let mut tree = Tree::new();
    let mut pending = vec![(Link::Header, 0usize)];

    while let Some((parent, level)) = pending.pop() {
        let (arity, value) = if level + 1 >= max_height {
            (0, nodes.random_terminal(rng))
        } else if level + 1 < min_height {
            nodes
                .random_non_terminal(rng)
                .unwrap_or_else(|| (0, nodes.random_terminal(rng)))
        } else {
            nodes.random_node(rng)
        };

        let index = tree.children_of(parent).len();
        let id = tree.attach(parent, index, value);
        pending.extend(std::iter::repeat_n((Link::Node(id), level + 1), arity));
    }
    tree
}

/// Generate `size` trees.
pub fn seed_population<V, G, R>(generator: &G, size: usize, rng: &mut R) -> Vec<Tree<V>>
where
    G: TreeGenerator<V>,
    R: Rng,
{
    (0..size).map(|_| generator.generate(rng)).collect()
}

/// Generate `size` structurally distinct trees, spending at most
/// `size * collision_factor` attempts.
///
/// Individuals keep the order in which they were first generated.
///
/// # Errors
///
/// Returns [`GpError::PopulationSeedingFailure`] when the attempt budget runs
/// out before `size` distinct trees were found.
pub fn seed_unique_population<V, G, R>(
    generator: &G,
    size: usize,
    collision_factor: usize,
    rng: &mut R,
) -> GpResult<Vec<Tree<V>>>
where
    V: Clone + Eq + Hash,
    G: TreeGenerator<V>,
    R: Rng,
{
    let max_attempts = size.saturating_mul(collision_factor);
    let mut seen = HashSet::with_capacity(size);
    let mut population = Vec::with_capacity(size);
    let mut attempts = 0;

    while population.len() < size && attempts < max_attempts {
        attempts += 1;
        let candidate = generator.generate(rng);
        if !seen.contains(&candidate) {
            seen.insert(candidate.clone());
            population.push(candidate);
        }
    }

    if population.len() < size {
        debug!(
            requested = size,
            produced = population.len(),
            attempts,
            "unique seeding budget exhausted"
        );
        return Err(GpError::PopulationSeedingFailure {
            requested: size,
            produced: population.len(),
            attempts,
        });
    }
    Ok(population)
}
