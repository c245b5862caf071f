//! CLI command evolving an even-parity circuit.
//!
//! Individuals are trees of logic gates over the input bits. Fitness counts
//! the input patterns a circuit misclassifies, so a perfect circuit scores 0.

#![allow(clippy::needless_pass_by_value)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use arbor_gp::gp::{
    CrossoverOp, EvolutionConfig, MutationOp, NodeGenerator, OnePointCrossover, PointMutation,
    ReproductionOp, StaticPipeline, SymbolClass, TournamentSelector, evolve,
};
use arbor_gp::{CursorRef, Evaluate, Tree, eval_tree};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use crate::cli::CliError;

/// A logic gate or an input bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Gate {
    /// The input bit at this position.
    Input(u8),
    And,
    Or,
    Nand,
    Nor,
}

impl Evaluate<u32> for Gate {
    type Output = bool;

    fn evaluate(&self, node: CursorRef<'_, Self>, pattern: &u32) -> bool {
        match self {
            Self::Input(bit) => (pattern >> bit) & 1 == 1,
            Self::And => node.children_iter().all(|c| c.eval(pattern)),
            Self::Or => node.children_iter().any(|c| c.eval(pattern)),
            Self::Nand => !node.children_iter().all(|c| c.eval(pattern)),
            Self::Nor => !node.children_iter().any(|c| c.eval(pattern)),
        }
    }
}

/// Terminals are the inputs, non-terminals the binary gates.
fn gate_table(bits: u8) -> Result<NodeGenerator<Gate>, CliError> {
    Ok(NodeGenerator::new(vec![
        SymbolClass::new(0, (0..bits).map(Gate::Input).collect()),
        SymbolClass::new(2, vec![Gate::And, Gate::Or, Gate::Nand, Gate::Nor]),
    ])?)
}

/// Number of input patterns on which `tree` disagrees with even parity.
fn misclassified(tree: &Tree<Gate>, bits: &u8) -> f64 {
    let wrong = (0..1u32 << bits)
        .filter(|pattern| eval_tree(tree, pattern) != Some(pattern.count_ones() % 2 == 0))
        .count();
    u32::try_from(wrong).map_or(f64::INFINITY, f64::from)
}

/// Execute the parity command.
pub(crate) fn execute(
    bits: u8,
    population: Option<usize>,
    generations: Option<usize>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    progress: bool,
) -> Result<(), CliError> {
    let mut config = match config {
        Some(path) => EvolutionConfig::from_json_file(&path)?,
        None => EvolutionConfig::default(),
    };
    if let Some(size) = population {
        config.population_size = size;
    }
    if let Some(max) = generations {
        config.max_generations = max;
    }
    config.target_fitness = config.target_fitness.or(Some(0.0));
    config.validate()?;

    let seed = seed.or(config.seed).unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(42)
    });
    let mut rng = SmallRng::seed_from_u64(seed);

    let init = config.generate.init_generator(gate_table(bits)?)?;
    let subtrees = config.generate.subtree_generator(gate_table(bits)?)?;
    let individuals = config.generate.seed(&init, config.population_size, &mut rng)?;

    let selector = TournamentSelector::from(&config.selection);
    let pipeline = StaticPipeline::new(
        &config.pipeline,
        MutationOp::new(PointMutation::from_config(subtrees, &config.mutation), selector),
        CrossoverOp::new(OnePointCrossover::try_from(&config.crossover)?, selector),
        ReproductionOp::new(selector),
    )?;

    info!(
        bits,
        seed,
        population = config.population_size,
        generations = config.max_generations,
        "starting parity run"
    );

    let bar = if progress {
        let bar = ProgressBar::new(u64::try_from(config.max_generations).unwrap_or(u64::MAX));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}")
                .map_err(|e| CliError::new(e.to_string()))?
                .progress_chars("=>-"),
        );
        Some(bar)
    } else {
        None
    };

    let outcome = evolve(
        individuals,
        &misclassified,
        &bits,
        &pipeline,
        &config,
        &mut rng,
        |record| {
            if let Some(bar) = &bar {
                bar.inc(1);
                bar.set_message(format!("(best {})", record.stats.best_fitness));
            }
        },
    )?;

    if let Some(bar) = bar {
        bar.finish_with_message("done");
    }

    println!("Evolution complete!");
    println!("  Seed: {seed}");
    println!("  Misclassified patterns: {}", outcome.best_fitness);
    println!("  Found in generation: {}", outcome.best_generation);
    println!("  Generations run: {}", outcome.generations.len());
    println!("  Circuit size: {} nodes, height {}", outcome.best.len(), outcome.best.height());
    println!("  Elapsed time: {:.1}s", outcome.elapsed_seconds);
    println!("  Circuit: {:?}", outcome.best);

    Ok(())
}
