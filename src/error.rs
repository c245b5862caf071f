//! Error types for tree surgery and evolution.
//!
//! Structural violations surface as [`TreeError`] at the call that attempted
//! them. Bounded-retry operators (crossover, mutation) never error; they report
//! a `bool` outcome instead. Seeding a unique population is the one budget
//! exhaustion that is fatal, reported as [`GpError::PopulationSeedingFailure`].

use thiserror::Error;

/// Structural errors raised by [`Tree`](crate::tree::Tree) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The addressed node already holds its maximum number of children.
    #[error("node capacity exceeded: max arity is {max_arity}")]
    CapacityExceeded {
        /// Maximum number of children the node may hold.
        max_arity: usize,
    },

    /// Attempted to insert a sibling in front of the root, or at the shoot.
    #[error("cannot insert a node in front of the root")]
    InvalidInsertion,

    /// The cursor does not address a position usable for this operation.
    #[error("cursor does not address a usable position")]
    InvalidCursor,

    /// The cursor was issued by a different tree.
    #[error("cursor belongs to another tree")]
    ForeignCursor,

    /// The node the cursor was anchored on has been erased.
    #[error("cursor refers to an erased node")]
    StaleCursor,

    /// One subtree contains the other, so they cannot be relinked.
    #[error("subtrees overlap")]
    OverlappingSubtrees,
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error for genetic programming runs.
#[derive(Debug, Error)]
pub enum GpError {
    /// The uniqueness budget ran out before the population was filled.
    #[error(
        "could not seed a unique population: produced {produced} of {requested} after {attempts} attempts"
    )]
    PopulationSeedingFailure {
        /// Number of distinct individuals requested.
        requested: usize,
        /// Number of distinct individuals produced before giving up.
        produced: usize,
        /// Number of generation attempts spent.
        attempts: usize,
    },

    /// A symbol table cannot drive tree generation.
    #[error("invalid symbol table: {0}")]
    InvalidSymbolTable(String),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tree structure error.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type for genetic programming operations.
pub type GpResult<T> = Result<T, GpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_error_display() {
        let err = TreeError::CapacityExceeded { max_arity: 2 };
        assert_eq!(err.to_string(), "node capacity exceeded: max arity is 2");
    }

    #[test]
    fn test_seeding_failure_display() {
        let err = GpError::PopulationSeedingFailure {
            requested: 10,
            produced: 4,
            attempts: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("4 of 10"));
        assert!(msg.contains("30 attempts"));
    }

    #[test]
    fn test_tree_error_converts() {
        let err: GpError = TreeError::StaleCursor.into();
        assert!(matches!(err, GpError::Tree(TreeError::StaleCursor)));
    }
}
