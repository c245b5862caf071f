// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Arbor: cursor-addressed n-ary trees and genetic programming operators.
//!
//! This crate provides:
//! - An arena-backed n-ary [`Tree`] with cursor navigation and subtree surgery
//! - Random tree generation from weighted symbol tables
//! - One-point crossover, point mutation and tournament selection
//! - A generational pipeline with elitism and parallel fitness evaluation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   gp: generators, operators, loop   │
//! ├─────────────────────────────────────┤
//! │   eval: payload dispatch            │
//! ├─────────────────────────────────────┤
//! │   tree: arena, cursors, surgery     │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod eval;
pub mod gp;
pub mod tree;

pub use error::{ConfigError, GpError, GpResult, TreeError, TreeResult};
pub use eval::{Evaluate, eval_tree};
pub use tree::{Cursor, CursorRef, Tree};
