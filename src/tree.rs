//! Cursor-addressed n-ary trees.
//!
//! A [`Tree`] owns its nodes in an arena; callers address positions through
//! [`Cursor`] handles, which are plain values that do not borrow the tree.
//! Reading goes through [`CursorRef`], a cursor bound to its tree.
//!
//! # Architecture
//!
//! ```text
//!            header ── root() = header[0], shoot() = header[1]
//!              │
//!            node ── children: [id, id, ..]   parent: id | header
//!           /    \
//!        node    node
//! ```
//!
//! Every node records its parent, so `parent()` and `level()` walk upward
//! without searching. The node count is the arena's live count and never
//! drifts from the number of reachable nodes.
//!
//! # Example
//!
//! ```
//! use arbor_gp::tree::Tree;
//!
//! let mut t = Tree::new();
//! let root = t.insert_below(t.root(), "plus")?;
//! t.insert_below(root, "x")?;
//! t.insert_below(root, "y")?;
//!
//! assert_eq!(t.len(), 3);
//! assert_eq!(t.height(), 2);
//! assert_eq!(t.croot().children(1).value(), Some(&"y"));
//! # Ok::<(), arbor_gp::error::TreeError>(())
//! ```

mod base;
mod cursor;
mod node;
mod surgery;
mod traverse;

pub use base::Tree;
pub use cursor::{Cursor, CursorRef, cursor_equal};
pub use surgery::swap_subtrees;
pub use traverse::Preorder;

pub(crate) use node::Link;
