//! Recursive interpretation of trees.
//!
//! Payload types implement [`Evaluate`] by matching on themselves and
//! recursing into children through [`CursorRef::eval`]. The arity a payload
//! sees is the node's child count, [`CursorRef::size`].

use crate::tree::{CursorRef, Tree};

/// A payload that can compute a value from its node and a context.
pub trait Evaluate<C>: Sized {
    /// Result of evaluating one node.
    type Output;

    /// Evaluate the node at `node`, whose payload is `self`.
    fn evaluate(&self, node: CursorRef<'_, Self>, ctx: &C) -> Self::Output;
}

impl<V> CursorRef<'_, V> {
    /// Evaluate the subtree at this cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not address a node.
    pub fn eval<C>(&self, ctx: &C) -> V::Output
    where
        V: Evaluate<C>,
    {
        match self.value() {
            Some(value) => value.evaluate(*self, ctx),
            None => panic!("cannot evaluate an invalid cursor"),
        }
    }
}

/// Evaluate a whole tree; `None` when it is empty.
pub fn eval_tree<V, C>(tree: &Tree<V>, ctx: &C) -> Option<V::Output>
where
    V: Evaluate<C>,
{
    let root = tree.croot();
    root.value().map(|value| value.evaluate(root, ctx))
}
