//! Genetic programming over [`Tree`](crate::tree::Tree) individuals.
//!
//! Individuals are plain trees of symbols. A symbol table drives random
//! generation; crossover, mutation and reproduction operators, each paired
//! with a selector, breed one generation from the previous one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │  Elitism │ Mutation │ Crossover │   │
//! │          │          │ Reproduction  │
//! ├─────────────────────────────────────┤
//! │     Selection  │  Fitness (rayon)   │
//! ├─────────────────────────────────────┤
//! │   Symbol tables → Tree generators   │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use arbor_gp::gp::{BasicGenerator, NodeGenerator, SymbolClass, TreeGenerator};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let nodes = NodeGenerator::new(vec![
//!     SymbolClass::new(0, vec!['x', 'y']),
//!     SymbolClass::new(2, vec!['+', '*']),
//! ])?;
//! let generator = BasicGenerator::new(nodes, 3, 3)?;
//! let tree = generator.generate(&mut SmallRng::seed_from_u64(1));
//! assert_eq!(tree.len(), 7);
//! # Ok::<(), arbor_gp::error::GpError>(())
//! ```

mod config;
mod crossover;
mod evolution;
mod fitness;
mod generate;
mod mutation;
mod selection;
mod symbol;

pub use config::EvolutionConfig;
pub use crossover::{CrossoverConfig, CrossoverStrategy, OnePointCrossover};
pub use evolution::{
    Breeder, CrossoverOp, EvolutionOutcome, GenerationStats, MutationOp, PipelineConfig,
    ReproductionOp, StaticPipeline, evolve,
};
pub use fitness::{Fitness, PopulationStats, evaluate_population};
pub use generate::{
    BasicGenerator, GenerateConfig, RampGenerator, TreeGenerator, seed_population,
    seed_unique_population,
};
pub use mutation::{MutationConfig, Mutator, PointMutation, SimpleMutation};
pub use selection::{
    RandomSelector, SelectionConfig, Selector, TournamentSelector, best_individuals, sort_indices,
};
pub use symbol::{NodeGenerator, SymbolClass, UniformSymbol};
