//! Walks over a tree and the structural trait impls built on them.

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::Tree;
use super::cursor::{Cursor, CursorRef, cursor_equal};
use super::node::Link;

impl<V> Tree<V> {
    /// The `n`-th node in breadth-first order, or [`shoot`](Self::shoot) when
    /// `n >= len()`.
    #[must_use]
    pub fn rank_is(&self, n: usize) -> Cursor {
        if n >= self.len() {
            return self.shoot();
        }

        let mut remaining = n;
        let mut queue = VecDeque::from([(Link::Header, 0)]);
        while let Some((link, pos)) = queue.pop_front() {
            if remaining == 0 {
                return Cursor::new(self.anchor(link), pos);
            }
            remaining -= 1;
            let id = self.children_of(link)[pos];
            let arity = self.arena[id].children.len();
            queue.extend((0..arity).map(|i| (Link::Node(id), i)));
        }
        self.shoot()
    }

    /// Depth-first, parent-before-children walk over every node.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_, V> {
        let stack = if self.is_empty() {
            Vec::new()
        } else {
            vec![(Link::Header, 0)]
        };
        Preorder { tree: self, stack }
    }
}

/// Iterator returned by [`Tree::preorder`].
pub struct Preorder<'t, V> {
    tree: &'t Tree<V>,
    stack: Vec<(Link, usize)>,
}

impl<'t, V> Iterator for Preorder<'t, V> {
    type Item = CursorRef<'t, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (link, pos) = self.stack.pop()?;
        let id = self.tree.children_of(link)[pos];
        let arity = self.tree.arena[id].children.len();
        self.stack
            .extend((0..arity).rev().map(|i| (Link::Node(id), i)));
        Some(self.tree.at(Cursor::new(self.tree.anchor(link), pos)))
    }
}

impl<V> fmt::Debug for Preorder<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preorder")
            .field("pending", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl<V: PartialEq> PartialEq for Tree<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && cursor_equal(self.croot(), other.croot())
    }
}

impl<V: Eq> Eq for Tree<V> {}

impl<V: Hash> Hash for Tree<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for node in self.preorder() {
            node.value().hash(state);
            node.size().hash(state);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Tree<V> {
    /// Nested form, e.g. `plus(sin(x), minus(y, 2))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<empty>");
        }
        write_subtree(f, self.croot())
    }
}

/// A pending step of the nested-form writer.
enum Piece<'t, V> {
    Node(CursorRef<'t, V>),
    Text(&'static str),
}

fn write_subtree<V: fmt::Debug>(f: &mut fmt::Formatter<'_>, node: CursorRef<'_, V>) -> fmt::Result {
    let mut pending = vec![Piece::Node(node)];
    while let Some(piece) = pending.pop() {
        let node = match piece {
            Piece::Text(text) => {
                f.write_str(text)?;
                continue;
            }
            Piece::Node(node) => node,
        };
        if let Some(value) = node.value() {
            write!(f, "{value:?}")?;
        }
        let arity = node.size();
        if arity > 0 {
            pending.push(Piece::Text(")"));
            for i in (0..arity).rev() {
                pending.push(Piece::Node(node.children(i)));
                if i > 0 {
                    pending.push(Piece::Text(", "));
                }
            }
            pending.push(Piece::Text("("));
        }
    }
    Ok(())
}
