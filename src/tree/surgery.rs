//! Relinking operations: subtrees change place without being copied.
//!
//! Node ids survive a same-tree relink, so cursors anchored on a moved node's
//! children keep working. Subtrees that cross into another tree are
//! re-allocated in the destination arena, and every cursor anchored inside
//! them goes stale.

use super::Tree;
use super::cursor::Cursor;
use super::node::{Link, NodeId};
use crate::error::{TreeError, TreeResult};

impl<V> Tree<V> {
    /// Replace the subtree at `dst` with the subtree at `src`, which is
    /// detached from its old place. The subtree previously at `dst` is
    /// destroyed.
    ///
    /// `src` may lie inside `dst`'s subtree. Moving a node onto itself is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if either cursor is invalid,
    /// [`TreeError::OverlappingSubtrees`] if `src` is a proper ancestor of
    /// `dst`.
    pub fn move_subtree(&mut self, dst: Cursor, src: Cursor) -> TreeResult<()> {
        let dst_id = self.node_at(dst)?.ok_or(TreeError::InvalidCursor)?;
        let src_id = self.node_at(src)?.ok_or(TreeError::InvalidCursor)?;
        if dst_id == src_id {
            return Ok(());
        }
        if self.is_ancestor(src_id, dst_id) {
            return Err(TreeError::OverlappingSubtrees);
        }

        self.detach(src_id);
        let parent = self.arena[dst_id].parent;
        let pos = self.position_of(dst_id);
        self.children_of_mut(parent)[pos] = src_id;
        self.arena[src_id].parent = parent;
        self.free_subtree(dst_id);
        Ok(())
    }

    /// Detach the subtree at `src` and insert it as a sibling directly in
    /// front of the node at `pos`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if either cursor is invalid,
    /// [`TreeError::InvalidInsertion`] if `pos` is the root,
    /// [`TreeError::OverlappingSubtrees`] if `src` contains `pos`,
    /// [`TreeError::CapacityExceeded`] if `pos`'s parent is full.
    pub fn move_and_insert_subtree(&mut self, pos: Cursor, src: Cursor) -> TreeResult<()> {
        let pos_id = self.node_at(pos)?.ok_or(TreeError::InvalidCursor)?;
        let src_id = self.node_at(src)?.ok_or(TreeError::InvalidCursor)?;
        let parent = self.arena[pos_id].parent;
        if parent == Link::Header {
            return Err(TreeError::InvalidInsertion);
        }
        if src_id == pos_id {
            return Ok(());
        }
        if self.is_ancestor(src_id, pos_id) {
            return Err(TreeError::OverlappingSubtrees);
        }
        if self.arena[src_id].parent != parent {
            self.check_capacity(parent, 1)?;
        }

        self.detach(src_id);
        let index = self.position_of(pos_id);
        self.children_of_mut(parent).insert(index, src_id);
        self.arena[src_id].parent = parent;
        Ok(())
    }

    /// Exchange the subtree at `c1` in this tree with the subtree at `c2` in
    /// `other`.
    ///
    /// Either side may be an insertion point instead of a node: the root of
    /// an empty tree, or the end position of a node. The subtree on the other
    /// side is then moved there and its old place closes up.
    ///
    /// Each tree owns its own arena, so the exchanged subtrees are moved node
    /// by node: the cost is O(k) in the number of nodes moved, not a constant
    /// relink. Cursors anchored inside a moved subtree go stale. Use
    /// [`swap_subtrees_within`](Self::swap_subtrees_within) for an O(1)
    /// exchange inside one tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if a side is neither a node nor an
    /// insertion point, [`TreeError::CapacityExceeded`] if a moved subtree
    /// does not fit the receiving tree's arity ceiling. Neither tree changes
    /// on error.
    pub fn swap_subtrees(&mut self, c1: Cursor, other: &mut Self, c2: Cursor) -> TreeResult<()> {
        let l1 = self.resolve_link(c1)?;
        let l2 = other.resolve_link(c2)?;
        let n1 = self.children_of(l1).get(c1.pos).copied();
        let n2 = other.children_of(l2).get(c2.pos).copied();

        match (n1, n2) {
            (Some(a), Some(b)) => {
                self.check_fits(other.at(c2))?;
                other.check_fits(self.at(c1))?;
                let b_new = other.transplant(b, self, l1);
                self.children_of_mut(l1)[c1.pos] = b_new;
                let a_new = self.transplant(a, other, l2);
                other.children_of_mut(l2)[c2.pos] = a_new;
            }
            (Some(a), None) => {
                other.check_attach(l2, c2.pos)?;
                other.check_fits(self.at(c1))?;
                self.children_of_mut(l1).remove(c1.pos);
                let a_new = self.transplant(a, other, l2);
                other.children_of_mut(l2).push(a_new);
            }
            (None, Some(b)) => {
                self.check_attach(l1, c1.pos)?;
                self.check_fits(other.at(c2))?;
                other.children_of_mut(l2).remove(c2.pos);
                let b_new = other.transplant(b, self, l1);
                self.children_of_mut(l1).push(b_new);
            }
            (None, None) => {
                self.check_attach(l1, c1.pos)?;
                other.check_attach(l2, c2.pos)?;
            }
        }
        Ok(())
    }

    /// Exchange two disjoint subtrees of this tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if either cursor is invalid,
    /// [`TreeError::OverlappingSubtrees`] if one subtree contains the other.
    pub fn swap_subtrees_within(&mut self, c1: Cursor, c2: Cursor) -> TreeResult<()> {
        let a = self.node_at(c1)?.ok_or(TreeError::InvalidCursor)?;
        let b = self.node_at(c2)?.ok_or(TreeError::InvalidCursor)?;
        if a == b {
            return Ok(());
        }
        if self.is_ancestor(a, b) || self.is_ancestor(b, a) {
            return Err(TreeError::OverlappingSubtrees);
        }

        let (pa, ia) = (self.arena[a].parent, self.position_of(a));
        let (pb, ib) = (self.arena[b].parent, self.position_of(b));
        self.children_of_mut(pa)[ia] = b;
        self.children_of_mut(pb)[ib] = a;
        self.arena[a].parent = pb;
        self.arena[b].parent = pa;
        Ok(())
    }

    /// Whether one more child may be appended at `pos` under `link`.
    fn check_attach(&self, link: Link, pos: usize) -> TreeResult<()> {
        let len = self.children_of(link).len();
        if pos != len || (link == Link::Header && len != 0) {
            return Err(TreeError::InvalidCursor);
        }
        self.check_capacity(link, 1)
    }

    /// Move the detached subtree at `id` into `dst`'s arena below `parent`.
    /// The caller links the returned id into `parent`'s child list.
    fn transplant(&mut self, id: NodeId, dst: &mut Self, parent: Link) -> NodeId {
        let node = self.arena.take(id);
        let root = dst.arena.alloc(node.value, parent);
        let mut work: Vec<(NodeId, NodeId)> =
            node.children.into_iter().rev().map(|child| (child, root)).collect();
        while let Some((next, new_parent)) = work.pop() {
            let node = self.arena.take(next);
            let new_id = dst.arena.alloc(node.value, Link::Node(new_parent));
            dst.arena[new_parent].children.push(new_id);
            work.extend(node.children.into_iter().rev().map(|child| (child, new_id)));
        }
        root
    }
}

/// Exchange subtrees between two trees.
///
/// See [`Tree::swap_subtrees`]; use [`Tree::swap_subtrees_within`] for two
/// positions in the same tree.
///
/// # Errors
///
/// As [`Tree::swap_subtrees`].
pub fn swap_subtrees<V>(t1: &mut Tree<V>, c1: Cursor, t2: &mut Tree<V>, c2: Cursor) -> TreeResult<()> {
    t1.swap_subtrees(c1, t2, c2)
}
