//! Arena storage backing a [`Tree`](super::Tree).
//!
//! Nodes live in a slot vector and refer to each other by [`NodeId`]. Parent
//! back-references are plain ids, so walking upward is O(1) per step without
//! any shared ownership. Each slot carries a generation counter that is bumped
//! when the slot is released, which lets cursors detect that the node they were
//! anchored on is gone.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one tree instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreeId(u64);

impl TreeId {
    /// Allocate a fresh identity.
    pub(crate) fn fresh() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Generational handle of a node inside one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId {
    index: usize,
    generation: u32,
}

/// What a node hangs below: the tree header (it is the root) or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Link {
    Header,
    Node(NodeId),
}

/// A payload plus its structural links.
#[derive(Debug)]
pub(crate) struct Node<V> {
    pub(crate) value: V,
    pub(crate) parent: Link,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot<V> {
    generation: u32,
    node: Option<Node<V>>,
}

/// Slot vector with a free list.
#[derive(Debug)]
pub(crate) struct Arena<V> {
    slots: Vec<Slot<V>>,
    free: Vec<usize>,
    live: usize,
}

impl<V> Arena<V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<V>> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<V>> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Store a new childless node.
    pub(crate) fn alloc(&mut self, value: V, parent: Link) -> NodeId {
        let node = Node {
            value,
            parent,
            children: Vec::new(),
        };
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        }
    }

    /// Remove a node from the arena and hand it back.
    ///
    /// The node's children are left untouched; the caller owns them now.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub(crate) fn take(&mut self, id: NodeId) -> Node<V> {
        let slot = match self.slots.get_mut(id.index) {
            Some(slot) if slot.generation == id.generation => slot,
            _ => panic!("node {id:?} is not live"),
        };
        let Some(node) = slot.node.take() else {
            panic!("node {id:?} is not live");
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        node
    }
}

impl<V> Index<NodeId> for Arena<V> {
    type Output = Node<V>;

    fn index(&self, id: NodeId) -> &Node<V> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live"),
        }
    }
}

impl<V> IndexMut<NodeId> for Arena<V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<V> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live"),
        }
    }
}
