#![no_main]

//! Tree surgery fuzzer.
//!
//! Drives arbitrary sequences of insertions, erasures, copies, moves and
//! cross-tree swaps against two trees, checking after every step that each
//! tree's node count matches what is reachable from its root and that no
//! node exceeds the arity ceiling.

use arbitrary::Arbitrary;
use arbor_gp::tree::{Cursor, CursorRef, Tree};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated operation. Ranks are reduced modulo the tree size.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzOp {
    InsertBelow { left: bool, rank: u16, value: u8 },
    Insert { left: bool, rank: u16, value: u8 },
    InsertAbove { left: bool, rank: u16, value: u8 },
    Erase { left: bool, rank: u16 },
    Assign { left: bool, dst: u16, src: u16 },
    CopyBelow { left: bool, dst: u16, src: u16 },
    Move { left: bool, dst: u16, src: u16 },
    MoveAndInsert { left: bool, dst: u16, src: u16 },
    SwapWithin { left: bool, a: u16, b: u16 },
    SwapAcross { a: u16, b: u16 },
    Clear { left: bool },
}

/// Structured input for tree fuzzing.
#[derive(Arbitrary, Debug)]
struct TreeOpsInput {
    /// Arity ceiling for both trees; `None` leaves them unbounded.
    max_arity: Option<u8>,
    /// Operations applied in order.
    ops: Vec<FuzzOp>,
}

const MAX_NODES: usize = 4096;

fn at(tree: &Tree<u8>, rank: u16) -> Cursor {
    if tree.is_empty() {
        return tree.root();
    }
    tree.rank_is(usize::from(rank) % tree.len())
}

fn reachable(node: CursorRef<'_, u8>) -> usize {
    if node.invalid() {
        return 0;
    }
    1 + node.children_iter().map(reachable).sum::<usize>()
}

fn check(tree: &Tree<u8>) {
    assert_eq!(tree.len(), reachable(tree.croot()), "size drifted");
    if let Some(max_arity) = tree.max_arity() {
        assert!(tree.preorder().all(|c| c.size() <= max_arity), "arity exceeded");
    }
}

fn apply(trees: &mut [Tree<u8>; 2], op: &FuzzOp) {
    let pick = |left: bool| usize::from(!left);
    match *op {
        FuzzOp::InsertBelow { left, rank, value } => {
            let t = &mut trees[pick(left)];
            let pos = at(t, rank);
            let _ = t.insert_below(pos, value);
        }
        FuzzOp::Insert { left, rank, value } => {
            let t = &mut trees[pick(left)];
            let pos = at(t, rank);
            let _ = t.insert(pos, value);
        }
        FuzzOp::InsertAbove { left, rank, value } => {
            let t = &mut trees[pick(left)];
            let pos = at(t, rank);
            let _ = t.insert_above(pos, value);
        }
        FuzzOp::Erase { left, rank } => {
            let t = &mut trees[pick(left)];
            let pos = at(t, rank);
            t.erase(pos);
        }
        FuzzOp::Assign { left, dst, src } => {
            let (dst_tree, src_tree) = split(trees, left);
            if dst_tree.len() + src_tree.len() < MAX_NODES {
                let pos = at(dst_tree, dst);
                let _ = dst_tree.assign(pos, src_tree.at(at(src_tree, src)));
            }
        }
        FuzzOp::CopyBelow { left, dst, src } => {
            let (dst_tree, src_tree) = split(trees, left);
            if dst_tree.len() + src_tree.len() < MAX_NODES {
                let pos = at(dst_tree, dst);
                let _ = dst_tree.insert_subtree_below(pos, src_tree.at(at(src_tree, src)));
            }
        }
        FuzzOp::Move { left, dst, src } => {
            let t = &mut trees[pick(left)];
            let (dst, src) = (at(t, dst), at(t, src));
            let _ = t.move_subtree(dst, src);
        }
        FuzzOp::MoveAndInsert { left, dst, src } => {
            let t = &mut trees[pick(left)];
            let (dst, src) = (at(t, dst), at(t, src));
            let _ = t.move_and_insert_subtree(dst, src);
        }
        FuzzOp::SwapWithin { left, a, b } => {
            let t = &mut trees[pick(left)];
            let (a, b) = (at(t, a), at(t, b));
            let _ = t.swap_subtrees_within(a, b);
        }
        FuzzOp::SwapAcross { a, b } => {
            let [t1, t2] = trees;
            let (c1, c2) = (at(t1, a), at(t2, b));
            let total = t1.len() + t2.len();
            let _ = t1.swap_subtrees(c1, t2, c2);
            assert_eq!(t1.len() + t2.len(), total, "swap changed node count");
        }
        FuzzOp::Clear { left } => trees[pick(left)].clear(),
    }
}

/// Destination and source trees for a copy.
fn split(trees: &mut [Tree<u8>; 2], left: bool) -> (&mut Tree<u8>, &Tree<u8>) {
    let [t1, t2] = trees;
    if left { (t1, &*t2) } else { (t2, &*t1) }
}

fuzz_target!(|input: TreeOpsInput| {
    let make = || match input.max_arity {
        Some(n) => Tree::with_max_arity(usize::from(n)),
        None => Tree::new(),
    };
    let mut trees = [make(), make()];

    for op in input.ops.iter().take(256) {
        apply(&mut trees, op);
        check(&trees[0]);
        check(&trees[1]);
    }
});
