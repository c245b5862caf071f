//! Symbol tables that drive random tree generation.
//!
//! Symbols are grouped into arity classes (terminals, unary, binary, ...).
//! A [`NodeGenerator`] first draws a class by weight, then a symbol uniformly
//! within that class.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::error::{GpError, GpResult};

/// Uniform draw from a fixed, non-empty list of symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSymbol<V> {
    symbols: Vec<V>,
}

impl<V: Clone> UniformSymbol<V> {
    /// Wrap a symbol list.
    ///
    /// # Errors
    ///
    /// Returns [`GpError::InvalidSymbolTable`] if `symbols` is empty.
    pub fn new(symbols: Vec<V>) -> GpResult<Self> {
        if symbols.is_empty() {
            return Err(GpError::InvalidSymbolTable(
                "symbol list is empty".to_string(),
            ));
        }
        Ok(Self { symbols })
    }

    /// Draw one symbol.
    pub fn random<R: Rng>(&self, rng: &mut R) -> V {
        self.symbols[rng.gen_range(0..self.symbols.len())].clone()
    }

    /// The symbols this table draws from.
    #[must_use]
    pub fn symbols(&self) -> &[V] {
        &self.symbols
    }
}

/// One arity class of a [`NodeGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolClass<V> {
    /// Number of children every symbol of this class takes.
    pub arity: usize,
    /// Relative weight when drawing a class.
    pub weight: f64,
    /// Symbols of this class.
    pub symbols: Vec<V>,
}

impl<V> SymbolClass<V> {
    /// A class weighted by its number of symbols.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(arity: usize, symbols: Vec<V>) -> Self {
        Self {
            arity,
            weight: symbols.len() as f64,
            symbols,
        }
    }

    /// Override the class weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

#[derive(Debug, Clone)]
struct Bucket<V> {
    arity: usize,
    symbols: UniformSymbol<V>,
}

/// Weighted table of arity classes.
#[derive(Debug, Clone)]
pub struct NodeGenerator<V> {
    buckets: Vec<Bucket<V>>,
    any: WeightedIndex<f64>,
    /// Index of the arity-0 bucket.
    terminal: usize,
    /// Weighted draw over the non-terminal buckets, with their indices.
    non_terminal: Option<(WeightedIndex<f64>, Vec<usize>)>,
}

impl<V: Clone> NodeGenerator<V> {
    /// Build a table from arity classes.
    ///
    /// # Errors
    ///
    /// Returns [`GpError::InvalidSymbolTable`] if a class is empty, a weight
    /// is not a positive finite number, two classes share an arity, or there
    /// is no terminal class.
    pub fn new(classes: Vec<SymbolClass<V>>) -> GpResult<Self> {
        let mut buckets = Vec::with_capacity(classes.len());
        let mut weights = Vec::with_capacity(classes.len());

        for class in classes {
            if !(class.weight.is_finite() && class.weight > 0.0) {
                return Err(GpError::InvalidSymbolTable(format!(
                    "arity {} has weight {}",
                    class.arity, class.weight
                )));
            }
            if buckets.iter().any(|b: &Bucket<V>| b.arity == class.arity) {
                return Err(GpError::InvalidSymbolTable(format!(
                    "arity {} appears twice",
                    class.arity
                )));
            }
            weights.push(class.weight);
            buckets.push(Bucket {
                arity: class.arity,
                symbols: UniformSymbol::new(class.symbols)?,
            });
        }

        let terminal = buckets
            .iter()
            .position(|b| b.arity == 0)
            .ok_or_else(|| GpError::InvalidSymbolTable("no terminal symbols".to_string()))?;
        let any = weighted(&weights)?;

        let indices: Vec<usize> = (0..buckets.len()).filter(|&i| i != terminal).collect();
        let non_terminal = if indices.is_empty() {
            None
        } else {
            let w: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();
            Some((weighted(&w)?, indices))
        };

        Ok(Self {
            buckets,
            any,
            terminal,
            non_terminal,
        })
    }

    /// Draw a class by weight, then a symbol from it. Returns `(arity, symbol)`.
    pub fn random_node<R: Rng>(&self, rng: &mut R) -> (usize, V) {
        let bucket = &self.buckets[self.any.sample(rng)];
        (bucket.arity, bucket.symbols.random(rng))
    }

    /// Draw a terminal symbol.
    pub fn random_terminal<R: Rng>(&self, rng: &mut R) -> V {
        self.buckets[self.terminal].symbols.random(rng)
    }

    /// Draw a non-terminal by class weight; `None` if there are none.
    pub fn random_non_terminal<R: Rng>(&self, rng: &mut R) -> Option<(usize, V)> {
        let (dist, indices) = self.non_terminal.as_ref()?;
        let bucket = &self.buckets[indices[dist.sample(rng)]];
        Some((bucket.arity, bucket.symbols.random(rng)))
    }

    /// Draw a symbol of exactly `arity`; `None` if that class does not exist.
    pub fn random_with_arity<R: Rng>(&self, arity: usize, rng: &mut R) -> Option<V> {
        self.buckets
            .iter()
            .find(|b| b.arity == arity)
            .map(|b| b.symbols.random(rng))
    }

    /// Whether any class has arity above zero.
    #[must_use]
    pub const fn has_non_terminals(&self) -> bool {
        self.non_terminal.is_some()
    }

    /// Largest arity in the table.
    #[must_use]
    pub fn max_arity(&self) -> usize {
        self.buckets.iter().map(|b| b.arity).max().unwrap_or(0)
    }
}

fn weighted(weights: &[f64]) -> GpResult<WeightedIndex<f64>> {
    WeightedIndex::new(weights).map_err(|e| GpError::InvalidSymbolTable(e.to_string()))
}
