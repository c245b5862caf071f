//! The [`Tree`] container: storage, queries, insertion, erase and assign.

use std::ops::{Index, IndexMut};

use super::cursor::{Anchor, Cursor, CursorRef};
use super::node::{Arena, Link, NodeId, TreeId};
use crate::error::{TreeError, TreeResult};

/// An n-ary tree of `V` payloads addressed through [`Cursor`]s.
///
/// The tree owns its nodes in an arena. A synthetic header sits above the
/// root: [`root`](Tree::root) is header position 0 and
/// [`shoot`](Tree::shoot) is header position 1, which never holds a node.
///
/// An optional maximum arity turns every node into a fixed-capacity node;
/// inserts that would exceed it fail with [`TreeError::CapacityExceeded`].
pub struct Tree<V> {
    pub(crate) id: TreeId,
    pub(crate) arena: Arena<V>,
    /// Children of the header: empty, or exactly the root.
    pub(crate) header: Vec<NodeId>,
    pub(crate) max_arity: Option<usize>,
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Tree<V> {
    /// An empty tree without an arity ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TreeId::fresh(),
            arena: Arena::new(),
            header: Vec::new(),
            max_arity: None,
        }
    }

    /// An empty tree whose nodes hold at most `max_arity` children.
    #[must_use]
    pub fn with_max_arity(max_arity: usize) -> Self {
        Self {
            max_arity: Some(max_arity),
            ..Self::new()
        }
    }

    /// Per-node child ceiling, if any.
    #[must_use]
    pub const fn max_arity(&self) -> Option<usize> {
        self.max_arity
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the tree has no root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Height of the whole tree; 0 when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        self.croot().height()
    }

    /// Root position. On an empty tree this is the only insertion point.
    #[must_use]
    pub const fn root(&self) -> Cursor {
        Cursor::new(Anchor::Header(self.id), 0)
    }

    /// Permanent end-of-rank sentinel; never valid.
    #[must_use]
    pub const fn shoot(&self) -> Cursor {
        Cursor::new(Anchor::Header(self.id), 1)
    }

    /// Read view of the root position.
    #[must_use]
    pub const fn croot(&self) -> CursorRef<'_, V> {
        CursorRef::new(self, self.root())
    }

    /// Read view of the shoot sentinel.
    #[must_use]
    pub const fn cshoot(&self) -> CursorRef<'_, V> {
        CursorRef::new(self, self.shoot())
    }

    /// Bind a cursor to this tree for reading.
    #[must_use]
    pub const fn at(&self, cursor: Cursor) -> CursorRef<'_, V> {
        CursorRef::new(self, cursor)
    }

    /// Payload at `cursor`.
    #[must_use]
    pub fn get(&self, cursor: Cursor) -> Option<&V> {
        let id = self.node_at(cursor).ok().flatten()?;
        Some(&self.arena[id].value)
    }

    /// Mutable payload at `cursor`.
    pub fn get_mut(&mut self, cursor: Cursor) -> Option<&mut V> {
        let id = self.node_at(cursor).ok().flatten()?;
        Some(&mut self.arena[id].value)
    }

    /// Exchange the entire contents of two trees.
    ///
    /// Cursors follow the contents they were issued for.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Append `value` as the last child of the node at `pos`, or make it the
    /// root when `pos` is the root position of an empty tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::CapacityExceeded`] if the node is full,
    /// [`TreeError::InvalidCursor`] if `pos` addresses neither a node nor the
    /// empty root.
    pub fn insert_below(&mut self, pos: Cursor, value: V) -> TreeResult<Cursor> {
        self.insert_below_node(pos, value).map(|(cursor, _)| cursor)
    }

    /// Insert `value` into the parent's child list at `pos`, shifting later
    /// siblings right. On an empty tree the root position makes `value` the
    /// root.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidInsertion`] in front of an existing root or at the
    /// shoot, [`TreeError::CapacityExceeded`] if the parent is full,
    /// [`TreeError::InvalidCursor`] if `pos` lies beyond the end position.
    pub fn insert(&mut self, pos: Cursor, value: V) -> TreeResult<Cursor> {
        self.insert_node(pos, value).map(|(cursor, _)| cursor)
    }

    /// Put `value` in place of the node at `pos` and make the displaced
    /// subtree its first child. On an empty tree the root position makes
    /// `value` the root.
    ///
    /// # Errors
    ///
    /// [`TreeError::CapacityExceeded`] when nodes may not hold any child,
    /// [`TreeError::InvalidCursor`] if `pos` addresses neither a node nor the
    /// empty root.
    pub fn insert_above(&mut self, pos: Cursor, value: V) -> TreeResult<Cursor> {
        let link = self.resolve_link(pos)?;
        let Some(below) = self.children_of(link).get(pos.pos).copied() else {
            return self.insert_root(link, pos, value);
        };
        if let Some(max_arity @ 0) = self.max_arity {
            return Err(TreeError::CapacityExceeded { max_arity });
        }

        let above = self.arena.alloc(value, link);
        self.children_of_mut(link)[pos.pos] = above;
        self.arena[below].parent = Link::Node(above);
        self.arena[above].children.push(below);
        Ok(pos)
    }

    /// Deep-copy the subtree at `src` as the last child of `pos`.
    ///
    /// # Errors
    ///
    /// As [`insert_below`](Self::insert_below); additionally
    /// [`TreeError::InvalidCursor`] if `src` is invalid and
    /// [`TreeError::CapacityExceeded`] if a copied node has more children than
    /// this tree allows.
    pub fn insert_subtree_below(&mut self, pos: Cursor, src: CursorRef<'_, V>) -> TreeResult<Cursor>
    where
        V: Clone,
    {
        let value = src.value().ok_or(TreeError::InvalidCursor)?;
        self.check_fits(src)?;
        let (cursor, id) = self.insert_below_node(pos, value.clone())?;
        self.copy_below(id, src);
        Ok(cursor)
    }

    /// Deep-copy the subtree at `src` into the parent's child list at `pos`.
    ///
    /// # Errors
    ///
    /// As [`insert`](Self::insert); additionally [`TreeError::InvalidCursor`]
    /// if `src` is invalid and [`TreeError::CapacityExceeded`] if a copied node
    /// has more children than this tree allows.
    pub fn insert_subtree(&mut self, pos: Cursor, src: CursorRef<'_, V>) -> TreeResult<Cursor>
    where
        V: Clone,
    {
        let value = src.value().ok_or(TreeError::InvalidCursor)?;
        self.check_fits(src)?;
        let (cursor, id) = self.insert_node(pos, value.clone())?;
        self.copy_below(id, src);
        Ok(cursor)
    }

    /// Deep-copy the subtree at `src` of this tree as the last child of `pos`.
    ///
    /// The copy is taken before anything changes, so `src` may contain `pos`.
    ///
    /// # Errors
    ///
    /// As [`insert_subtree_below`](Self::insert_subtree_below).
    pub fn copy_subtree_below(&mut self, pos: Cursor, src: Cursor) -> TreeResult<Cursor>
    where
        V: Clone,
    {
        let copy = self.copy_of(src)?;
        self.insert_subtree_below(pos, copy.croot())
    }

    /// Deep-copy the subtree at `src` of this tree into the parent's child
    /// list at `pos`. `src` may contain `pos`.
    ///
    /// # Errors
    ///
    /// As [`insert_subtree`](Self::insert_subtree).
    pub fn copy_subtree(&mut self, pos: Cursor, src: Cursor) -> TreeResult<Cursor>
    where
        V: Clone,
    {
        let copy = self.copy_of(src)?;
        self.insert_subtree(pos, copy.croot())
    }

    /// Delete the subtree at `pos`, children before parents.
    ///
    /// Returns the number of nodes removed; 0 if `pos` is not valid.
    pub fn erase(&mut self, pos: Cursor) -> usize {
        let Ok(Some(id)) = self.node_at(pos) else {
            return 0;
        };
        self.detach(id);
        self.free_subtree(id)
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        if let Some(root) = self.header.pop() {
            self.free_subtree(root);
        }
    }

    /// Replace the subtree at `pos` with a deep copy of the subtree at `src`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if either cursor is invalid,
    /// [`TreeError::CapacityExceeded`] if a copied node does not fit.
    pub fn assign(&mut self, pos: Cursor, src: CursorRef<'_, V>) -> TreeResult<()>
    where
        V: Clone,
    {
        let id = self.node_at(pos)?.ok_or(TreeError::InvalidCursor)?;
        let value = src.value().ok_or(TreeError::InvalidCursor)?;
        self.check_fits(src)?;

        for child in std::mem::take(&mut self.arena[id].children) {
            self.free_subtree(child);
        }
        self.arena[id].value = value.clone();
        self.copy_below(id, src);
        Ok(())
    }

    /// Replace the subtree at `pos` with a deep copy of the subtree at `src`
    /// of this tree. Either may contain the other.
    ///
    /// # Errors
    ///
    /// As [`assign`](Self::assign).
    pub fn assign_within(&mut self, pos: Cursor, src: Cursor) -> TreeResult<()>
    where
        V: Clone,
    {
        let copy = self.copy_of(src)?;
        self.assign(pos, copy.croot())
    }

    /// Replace the whole tree with a deep copy of the subtree at `src`.
    /// An invalid `src` leaves the tree empty.
    ///
    /// # Errors
    ///
    /// [`TreeError::CapacityExceeded`] if a copied node does not fit; the tree
    /// is left unchanged in that case.
    pub fn assign_from(&mut self, src: CursorRef<'_, V>) -> TreeResult<()>
    where
        V: Clone,
    {
        self.check_fits(src)?;
        self.clear();
        if let Some(value) = src.value() {
            let root = self.arena.alloc(value.clone(), Link::Header);
            self.header.push(root);
            self.copy_below(root, src);
        }
        Ok(())
    }

    /// A new unbounded tree holding a deep copy of the subtree at `src`.
    #[must_use]
    pub fn from_subtree(src: CursorRef<'_, V>) -> Self
    where
        V: Clone,
    {
        let mut tree = Self::new();
        if let Some(value) = src.value() {
            let root = tree.arena.alloc(value.clone(), Link::Header);
            tree.header.push(root);
            tree.copy_below(root, src);
        }
        tree
    }

    // ---- internals shared with the cursor, surgery and traversal code ----

    pub(crate) const fn anchor(&self, link: Link) -> Anchor {
        match link {
            Link::Header => Anchor::Header(self.id),
            Link::Node(id) => Anchor::Node(self.id, id),
        }
    }

    /// The parent a cursor is positioned under.
    pub(crate) fn resolve_link(&self, cursor: Cursor) -> TreeResult<Link> {
        match cursor.anchor {
            Anchor::Detached => Err(TreeError::InvalidCursor),
            Anchor::Header(tree) if tree == self.id => Ok(Link::Header),
            Anchor::Node(tree, id) if tree == self.id => {
                if self.arena.contains(id) {
                    Ok(Link::Node(id))
                } else {
                    Err(TreeError::StaleCursor)
                }
            }
            Anchor::Header(_) | Anchor::Node(..) => Err(TreeError::ForeignCursor),
        }
    }

    /// The node a cursor addresses, `None` for an in-range insertion point.
    pub(crate) fn node_at(&self, cursor: Cursor) -> TreeResult<Option<NodeId>> {
        let link = self.resolve_link(cursor)?;
        Ok(self.children_of(link).get(cursor.pos).copied())
    }

    pub(crate) fn children_of(&self, link: Link) -> &[NodeId] {
        match link {
            Link::Header => &self.header,
            Link::Node(id) => &self.arena[id].children,
        }
    }

    pub(crate) fn children_of_mut(&mut self, link: Link) -> &mut Vec<NodeId> {
        match link {
            Link::Header => &mut self.header,
            Link::Node(id) => &mut self.arena[id].children,
        }
    }

    /// Index of `id` in its parent's child list.
    pub(crate) fn position_of(&self, id: NodeId) -> usize {
        let parent = self.arena[id].parent;
        self.children_of(parent)
            .iter()
            .position(|&child| child == id)
            .unwrap_or_default()
    }

    /// A cursor addressing `id`.
    pub(crate) fn cursor_of(&self, id: NodeId) -> Cursor {
        Cursor::new(self.anchor(self.arena[id].parent), self.position_of(id))
    }

    /// Number of proper ancestors of `id`.
    pub(crate) fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut link = self.arena[id].parent;
        while let Link::Node(parent) = link {
            depth += 1;
            link = self.arena[parent].parent;
        }
        depth
    }

    pub(crate) fn subtree_height(&self, id: NodeId) -> usize {
        let mut height = 0;
        let mut stack = vec![(id, 1)];
        while let Some((next, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(self.arena[next].children.iter().map(|&child| (child, depth + 1)));
        }
        height
    }

    pub(crate) fn subtree_len(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.arena[next].children);
        }
        count
    }

    /// Whether `ancestor` lies strictly above `id`.
    pub(crate) fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut link = self.arena[id].parent;
        while let Link::Node(parent) = link {
            if parent == ancestor {
                return true;
            }
            link = self.arena[parent].parent;
        }
        false
    }

    pub(crate) fn check_capacity(&self, link: Link, extra: usize) -> TreeResult<()> {
        let max_arity = match link {
            Link::Header => 1,
            Link::Node(_) => match self.max_arity {
                Some(max_arity) => max_arity,
                None => return Ok(()),
            },
        };
        if self.children_of(link).len() + extra > max_arity {
            return Err(TreeError::CapacityExceeded { max_arity });
        }
        Ok(())
    }

    /// Check that every node of `src` respects this tree's arity ceiling.
    pub(crate) fn check_fits<W>(&self, src: CursorRef<'_, W>) -> TreeResult<()> {
        match self.max_arity {
            Some(max_arity) if max_fanout(src) > max_arity => {
                Err(TreeError::CapacityExceeded { max_arity })
            }
            _ => Ok(()),
        }
    }

    /// Allocate `value` under `link` at child index `index`.
    pub(crate) fn attach(&mut self, link: Link, index: usize, value: V) -> NodeId {
        let id = self.arena.alloc(value, link);
        self.children_of_mut(link).insert(index, id);
        id
    }

    /// Unlink `id` from its parent, leaving it in the arena.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let parent = self.arena[id].parent;
        let pos = self.position_of(id);
        self.children_of_mut(parent).remove(pos);
    }

    /// Drop a detached subtree, children first. Returns the node count.
    pub(crate) fn free_subtree(&mut self, id: NodeId) -> usize {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.arena[next].children.iter().rev());
        }
        // Reversed pre-order puts every node after its descendants.
        for &node in order.iter().rev() {
            self.arena.take(node);
        }
        order.len()
    }

    /// Append deep copies of `src`'s children below `parent`, pre-order.
    pub(crate) fn copy_below(&mut self, parent: NodeId, src: CursorRef<'_, V>)
    where
        V: Clone,
    {
        let mut work: Vec<_> = (0..src.size())
            .rev()
            .map(|i| (src.children(i), parent))
            .collect();
        while let Some((node, dst)) = work.pop() {
            let Some(value) = node.value() else {
                continue;
            };
            let index = self.arena[dst].children.len();
            let id = self.attach(Link::Node(dst), index, value.clone());
            work.extend((0..node.size()).rev().map(|i| (node.children(i), id)));
        }
    }

    /// A detached copy of the subtree at `src`, taken before a same-tree edit.
    fn copy_of(&self, src: Cursor) -> TreeResult<Self>
    where
        V: Clone,
    {
        self.node_at(src)?.ok_or(TreeError::InvalidCursor)?;
        Ok(Self::from_subtree(self.at(src)))
    }

    fn insert_root(&mut self, link: Link, pos: Cursor, value: V) -> TreeResult<Cursor> {
        if link == Link::Header && pos.pos == 0 && self.header.is_empty() {
            self.attach(Link::Header, 0, value);
            Ok(self.root())
        } else {
            Err(TreeError::InvalidCursor)
        }
    }

    fn insert_below_node(&mut self, pos: Cursor, value: V) -> TreeResult<(Cursor, NodeId)> {
        let link = self.resolve_link(pos)?;
        match self.children_of(link).get(pos.pos).copied() {
            Some(parent) => {
                let parent_link = Link::Node(parent);
                self.check_capacity(parent_link, 1)?;
                let index = self.arena[parent].children.len();
                let id = self.attach(parent_link, index, value);
                Ok((Cursor::new(self.anchor(parent_link), index), id))
            }
            None => {
                let cursor = self.insert_root(link, pos, value)?;
                Ok((cursor, self.header[0]))
            }
        }
    }

    fn insert_node(&mut self, pos: Cursor, value: V) -> TreeResult<(Cursor, NodeId)> {
        let link = self.resolve_link(pos)?;
        if link == Link::Header {
            if pos.pos == 0 && self.header.is_empty() {
                let cursor = self.insert_root(link, pos, value)?;
                return Ok((cursor, self.header[0]));
            }
            return Err(TreeError::InvalidInsertion);
        }
        if pos.pos > self.children_of(link).len() {
            return Err(TreeError::InvalidCursor);
        }
        self.check_capacity(link, 1)?;
        let id = self.attach(link, pos.pos, value);
        Ok((pos, id))
    }
}

/// Largest child count anywhere in the subtree at `src`.
fn max_fanout<W>(src: CursorRef<'_, W>) -> usize {
    let mut widest = 0;
    let mut stack = vec![src];
    while let Some(node) = stack.pop() {
        widest = widest.max(node.size());
        stack.extend(node.children_iter());
    }
    widest
}

impl<V: Clone> Clone for Tree<V> {
    /// Deep, compacting copy with a fresh identity; cursors of `self` are
    /// foreign to the clone.
    fn clone(&self) -> Self {
        let mut tree = Self::from_subtree(self.croot());
        tree.max_arity = self.max_arity;
        tree
    }
}

impl<V> Index<Cursor> for Tree<V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `cursor` does not address a node.
    fn index(&self, cursor: Cursor) -> &V {
        match self.get(cursor) {
            Some(value) => value,
            None => panic!("cursor {cursor:?} does not address a node"),
        }
    }
}

impl<V> IndexMut<Cursor> for Tree<V> {
    fn index_mut(&mut self, cursor: Cursor) -> &mut V {
        match self.get_mut(cursor) {
            Some(value) => value,
            None => panic!("cursor {cursor:?} does not address a node"),
        }
    }
}
