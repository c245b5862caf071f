//! Cursors: non-owning (parent, index) handles into a [`Tree`].
//!
//! A [`Cursor`] is a plain `Copy` value. It does not borrow the tree, so it can
//! be held across mutating calls; the tree validates it on every use. To read
//! through a cursor, pair it with its tree via [`Tree::at`], which yields a
//! [`CursorRef`].
//!
//! A cursor is in one of three states:
//!
//! - *valid*: its parent exists and `pos` addresses a live child.
//! - *addressable*: its parent exists but `pos` is past the last child. This
//!   is an insertion point (or the root position of an empty tree).
//! - *detached*: it has no parent at all. [`Cursor::default`] is detached.

use std::fmt;

use super::Tree;
use super::node::{Link, NodeId, TreeId};

/// What a cursor's position is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum Anchor {
    #[default]
    Detached,
    Header(TreeId),
    Node(TreeId, NodeId),
}

/// Position handle: a parent plus a child index.
///
/// Two cursors are equal when they share parent identity and index; payloads
/// are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    pub(crate) anchor: Anchor,
    pub(crate) pos: usize,
}

impl Cursor {
    pub(crate) const fn new(anchor: Anchor, pos: usize) -> Self {
        Self { anchor, pos }
    }

    /// A cursor with no parent.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            anchor: Anchor::Detached,
            pos: 0,
        }
    }

    /// Index among the parent's children.
    #[must_use]
    pub const fn pos(self) -> usize {
        self.pos
    }

    /// Whether this cursor has no parent.
    #[must_use]
    pub const fn is_detached(self) -> bool {
        matches!(self.anchor, Anchor::Detached)
    }

    /// The cursor one sibling to the right.
    #[must_use]
    pub const fn next_sibling(self) -> Self {
        Self {
            anchor: self.anchor,
            pos: self.pos + 1,
        }
    }

    /// The cursor one sibling to the left, if any.
    #[must_use]
    pub const fn prev_sibling(self) -> Option<Self> {
        if self.pos == 0 {
            None
        } else {
            Some(Self {
                anchor: self.anchor,
                pos: self.pos - 1,
            })
        }
    }
}

/// Read-only view of a cursor bound to its tree.
///
/// Navigation never fails: stepping off the tree yields an invalid view.
pub struct CursorRef<'t, V> {
    tree: &'t Tree<V>,
    cursor: Cursor,
}

impl<V> Clone for CursorRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for CursorRef<'_, V> {}

impl<'t, V> CursorRef<'t, V> {
    pub(crate) const fn new(tree: &'t Tree<V>, cursor: Cursor) -> Self {
        Self { tree, cursor }
    }

    /// The underlying handle.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The tree this view reads from.
    #[must_use]
    pub const fn tree(&self) -> &'t Tree<V> {
        self.tree
    }

    /// Index among the parent's children.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.cursor.pos
    }

    pub(crate) fn node_id(&self) -> Option<NodeId> {
        self.tree.node_at(self.cursor).ok().flatten()
    }

    /// Whether the cursor addresses a live node.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.node_id().is_some()
    }

    /// Negation of [`valid`](Self::valid).
    #[must_use]
    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    /// Payload of the addressed node.
    #[must_use]
    pub fn value(&self) -> Option<&'t V> {
        let tree = self.tree;
        self.node_id().map(|id| &tree.arena[id].value)
    }

    /// Number of children (the node's arity); 0 when invalid.
    #[must_use]
    pub fn size(&self) -> usize {
        self.node_id()
            .map_or(0, |id| self.tree.arena[id].children.len())
    }

    /// The `i`-th child position. Past the last child this is an insertion
    /// point; on an invalid cursor it is detached.
    #[must_use]
    pub fn children(&self, i: usize) -> Self {
        let cursor = match self.node_id() {
            Some(id) => Cursor::new(Anchor::Node(self.tree.id, id), i),
            None => Cursor::detached(),
        };
        Self::new(self.tree, cursor)
    }

    /// First child position.
    #[must_use]
    pub fn begin(&self) -> Self {
        self.children(0)
    }

    /// One past the last child.
    #[must_use]
    pub fn end(&self) -> Self {
        self.children(self.size())
    }

    /// Iterator over the child positions.
    pub fn children_iter(self) -> impl Iterator<Item = CursorRef<'t, V>> {
        (0..self.size()).map(move |i| self.children(i))
    }

    /// The parent position. Detached for the root and for invalid cursors.
    #[must_use]
    pub fn parent(&self) -> Self {
        let cursor = match self.tree.resolve_link(self.cursor) {
            Ok(Link::Node(parent)) => self.tree.cursor_of(parent),
            _ => Cursor::detached(),
        };
        Self::new(self.tree, cursor)
    }

    /// Height of the subtree: 1 for a leaf, 0 when invalid.
    #[must_use]
    pub fn height(&self) -> usize {
        self.node_id().map_or(0, |id| self.tree.subtree_height(id))
    }

    /// Depth below the root; the root position is level 0.
    #[must_use]
    pub fn level(&self) -> usize {
        match self.tree.resolve_link(self.cursor) {
            Ok(Link::Node(parent)) => self.tree.depth(parent) + 1,
            _ => 0,
        }
    }

    /// Number of nodes in the subtree; 0 when invalid.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.node_id().map_or(0, |id| self.tree.subtree_len(id))
    }

    /// Whether this is the tree's root position.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.cursor == self.tree.root()
    }

    /// Whether this is the tree's shoot sentinel.
    #[must_use]
    pub fn is_shoot(&self) -> bool {
        self.cursor == self.tree.shoot()
    }
}

impl<V> PartialEq for CursorRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.cursor == other.cursor
    }
}

impl<V> Eq for CursorRef<'_, V> {}

impl<V> PartialEq<Cursor> for CursorRef<'_, V> {
    fn eq(&self, other: &Cursor) -> bool {
        self.cursor == *other
    }
}

impl<V: fmt::Debug> fmt::Debug for CursorRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorRef")
            .field("cursor", &self.cursor)
            .field("value", &self.value())
            .finish()
    }
}

impl<'t, V> From<CursorRef<'t, V>> for Cursor {
    fn from(r: CursorRef<'t, V>) -> Self {
        r.cursor
    }
}

/// Structural equality of two subtrees.
///
/// Two invalid cursors are equal; a valid and an invalid one are not.
/// Otherwise payloads, arities and all children must match pairwise.
#[must_use]
pub fn cursor_equal<V: PartialEq>(a: CursorRef<'_, V>, b: CursorRef<'_, V>) -> bool {
    let mut pending = vec![(a, b)];
    while let Some((a, b)) = pending.pop() {
        match (a.value(), b.value()) {
            (None, None) => {}
            (Some(x), Some(y)) if x == y && a.size() == b.size() => {
                pending.extend(a.children_iter().zip(b.children_iter()));
            }
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree<&'static str> {
        let mut t = Tree::new();
        let root = t.insert_below(t.root(), "plus").unwrap();
        let sin = t.insert_below(root, "sin").unwrap();
        t.insert_below(sin, "x").unwrap();
        let minus = t.insert_below(root, "minus").unwrap();
        t.insert_below(minus, "y").unwrap();
        t.insert_below(minus, "2").unwrap();
        t
    }

    #[test]
    fn test_default_cursor_is_detached() {
        let t = sample();
        let c = t.at(Cursor::default());
        assert!(c.invalid());
        assert_eq!(c.size(), 0);
        assert_eq!(c.height(), 0);
        assert!(c.children(0).cursor().is_detached());
    }

    #[test]
    fn test_navigation() {
        let t = sample();
        let root = t.croot();
        assert_eq!(root.value(), Some(&"plus"));
        assert_eq!(root.size(), 2);
        assert_eq!(root.children(1).children(0).value(), Some(&"y"));
        assert_eq!(root.children(1).parent(), root);
        assert!(root.parent().cursor().is_detached());
        assert!(root.end().invalid());
        assert_eq!(root.end().pos(), 2);
    }

    #[test]
    fn test_height_and_level() {
        let t = sample();
        let root = t.croot();
        assert_eq!(root.height(), 3);
        assert_eq!(root.level(), 0);
        assert_eq!(root.children(0).height(), 2);
        assert_eq!(root.children(0).children(0).level(), 2);
        assert_eq!(root.children(0).children(0).height(), 1);
        assert_eq!(root.num_nodes(), 6);
    }

    #[test]
    fn test_root_and_shoot() {
        let t = sample();
        assert!(t.croot().is_root());
        assert!(t.cshoot().is_shoot());
        assert!(t.cshoot().invalid());
        assert!(!t.croot().children(0).is_root());
    }

    #[test]
    fn test_cursor_equality_is_positional() {
        let t = sample();
        let a = t.croot().children(0);
        let b = t.croot().children(1).parent().children(0);
        assert_eq!(a, b);
        assert_ne!(a, t.croot().children(1));
    }

    #[test]
    fn test_cursor_equal_structural() {
        let t1 = sample();
        let t2 = sample();
        assert!(cursor_equal(t1.croot(), t2.croot()));
        assert!(!cursor_equal(t1.croot().children(0), t2.croot().children(1)));
        assert!(cursor_equal(t1.cshoot(), t2.cshoot()));
        assert!(!cursor_equal(t1.croot(), t2.cshoot()));
    }

    #[test]
    fn test_siblings() {
        let t = sample();
        let first = t.croot().children(0).cursor();
        let second = first.next_sibling();
        assert_eq!(t.at(second).value(), Some(&"minus"));
        assert_eq!(second.prev_sibling(), Some(first));
        assert_eq!(first.prev_sibling(), None);
    }
}
