//! Scenario tests for tree surgery through the public API.
//!
//! Fixtures are the expression trees `+(sin(x), -(y, 2))` and `-(cos(y), x)`.
//!
//! Run with: cargo test --test tree_tests

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use arbor_gp::tree::{Cursor, Tree, swap_subtrees};
use arbor_gp::{CursorRef, TreeError};

/// +(sin(x), -(y, 2))
fn tree_a() -> Tree<&'static str> {
    let mut t = Tree::new();
    let plus = t.insert_below(t.root(), "+").unwrap();
    let sin = t.insert_below(plus, "sin").unwrap();
    t.insert_below(sin, "x").unwrap();
    let minus = t.insert_below(plus, "-").unwrap();
    t.insert_below(minus, "y").unwrap();
    t.insert_below(minus, "2").unwrap();
    t
}

/// -(cos(y), x)
fn tree_b() -> Tree<&'static str> {
    let mut t = Tree::new();
    let minus = t.insert_below(t.root(), "-").unwrap();
    let cos = t.insert_below(minus, "cos").unwrap();
    t.insert_below(cos, "y").unwrap();
    t.insert_below(minus, "x").unwrap();
    t
}

fn labels(t: &Tree<&'static str>) -> Vec<&'static str> {
    t.preorder().filter_map(|c| c.value().copied()).collect()
}

/// Node count by walking children from `node`.
fn reachable<V>(node: CursorRef<'_, V>) -> usize {
    if node.invalid() {
        return 0;
    }
    1 + node.children_iter().map(reachable).sum::<usize>()
}

fn child(t: &Tree<&'static str>, path: &[usize]) -> Cursor {
    path.iter()
        .fold(t.croot(), |node, &i| node.children(i))
        .cursor()
}

#[test]
fn test_fixture_shapes() {
    let a = tree_a();
    let b = tree_b();
    assert_eq!((a.len(), a.height()), (6, 3));
    assert_eq!((b.len(), b.height()), (4, 3));
    assert_eq!(format!("{a:?}"), r#""+"("sin"("x"), "-"("y", "2"))"#);
}

#[test]
fn test_swap_root_into_child() {
    let mut a = tree_a();
    let mut b = tree_b();
    let a_sin = child(&a, &[0]);
    let b_root = b.root();

    let moved_into_a = b.croot().num_nodes();
    let moved_into_b = a.at(a_sin).num_nodes();
    swap_subtrees(&mut a, a_sin, &mut b, b_root).unwrap();

    assert_eq!(a.len(), 6 - moved_into_b + moved_into_a);
    assert_eq!(b.len(), 4 - moved_into_a + moved_into_b);
    assert_eq!(labels(&a), ["+", "-", "cos", "y", "x", "-", "y", "2"]);
    assert_eq!(labels(&b), ["sin", "x"]);
    assert_eq!(a.height(), 4);
    assert_eq!(b.height(), 2);
    assert_eq!(reachable(a.croot()), a.len());
    assert_eq!(reachable(b.croot()), b.len());
}

#[test]
fn test_swap_is_reversible() {
    let mut a = tree_a();
    let mut b = tree_b();
    let (c1, c2) = (child(&a, &[1, 0]), child(&b, &[0]));
    a.swap_subtrees(c1, &mut b, c2).unwrap();
    assert_eq!(labels(&a), ["+", "sin", "x", "-", "cos", "y", "2"]);
    assert_eq!(labels(&b), ["-", "y", "x"]);

    let (c1, c2) = (child(&a, &[1, 0]), child(&b, &[0]));
    a.swap_subtrees(c1, &mut b, c2).unwrap();
    assert_eq!(a, tree_a());
    assert_eq!(b, tree_b());
}

#[test]
fn test_swap_with_empty_tree_moves_subtree() {
    let mut a = tree_a();
    let mut empty = Tree::new();
    let (c1, root) = (child(&a, &[1]), empty.root());
    a.swap_subtrees(c1, &mut empty, root).unwrap();

    assert_eq!(labels(&a), ["+", "sin", "x"]);
    assert_eq!(labels(&empty), ["-", "y", "2"]);
    assert_eq!(a.len() + empty.len(), 6);
}

#[test]
fn test_rank_is_matches_level_order() {
    let a = tree_a();
    let level_order: Vec<_> = (0..a.len())
        .map(|k| *a.at(a.rank_is(k)).value().unwrap())
        .collect();
    assert_eq!(level_order, ["+", "sin", "-", "x", "y", "2"]);
    assert_eq!(a.rank_is(a.len()), a.shoot());
    assert!(a.at(a.rank_is(100)).invalid());
}

#[test]
fn test_copy_is_independent() {
    let a = tree_a();
    let mut copy = Tree::from_subtree(a.croot());
    assert_eq!(copy, a);

    let pos = child(&copy, &[1, 1]);
    copy[pos] = "3";
    let leaf = child(&copy, &[0]);
    copy.erase(leaf);

    assert_eq!(a, tree_a());
    assert_ne!(copy, a);
    assert_eq!(copy.len(), 4);
}

#[test]
fn test_copy_subtree_between_trees() {
    let mut a = tree_a();
    let b = tree_b();
    let sin = child(&a, &[0]);
    let cursor = a.insert_subtree_below(sin, b.croot().children(0)).unwrap();

    assert_eq!(a.at(cursor).value(), Some(&"cos"));
    assert_eq!(a.at(cursor).level(), 2);
    assert_eq!(labels(&a), ["+", "sin", "x", "cos", "y", "-", "y", "2"]);
    assert_eq!(b, tree_b());
}

#[test]
fn test_assign_replaces_subtree() {
    let mut a = tree_a();
    let b = tree_b();
    let pos = child(&a, &[1]);
    a.assign(pos, b.croot()).unwrap();
    assert_eq!(labels(&a), ["+", "sin", "x", "-", "cos", "y", "x"]);
    assert_eq!(reachable(a.croot()), a.len());
}

#[test]
fn test_move_subtree_up() {
    let mut a = tree_a();
    let (dst, src) = (child(&a, &[0]), child(&a, &[1, 1]));
    a.move_subtree(dst, src).unwrap();
    assert_eq!(labels(&a), ["+", "2", "-", "y"]);
    assert_eq!(a.len(), 4);
}

#[test]
fn test_move_and_insert_subtree() {
    let mut a = tree_a();
    let (pos, src) = (child(&a, &[0]), child(&a, &[1, 0]));
    a.move_and_insert_subtree(pos, src).unwrap();
    assert_eq!(labels(&a), ["+", "y", "sin", "x", "-", "2"]);
    assert_eq!(a.croot().size(), 3);

    let root = a.root();
    assert_eq!(
        a.move_and_insert_subtree(root, child(&a, &[0])),
        Err(TreeError::InvalidInsertion)
    );
}

#[test]
fn test_insert_above_and_sibling_insert() {
    let mut a = tree_a();
    let minus = child(&a, &[1]);
    a.insert_above(minus, "neg").unwrap();
    let sin = child(&a, &[0]);
    a.insert(sin, "z").unwrap();

    assert_eq!(labels(&a), ["+", "z", "sin", "x", "neg", "-", "y", "2"]);
    assert_eq!(a.height(), 4);
    let root = a.root();
    assert_eq!(a.insert(root, "w"), Err(TreeError::InvalidInsertion));
}

#[test]
fn test_erase_root_empties_tree() {
    let mut a = tree_a();
    let root = a.root();
    assert_eq!(a.erase(root), 6);
    assert!(a.is_empty());
    assert_eq!(a.len(), 0);
    assert_eq!(a.erase(root), 0);
}

#[test]
fn test_fixed_arity_ceiling() {
    let mut t = Tree::with_max_arity(2);
    let plus = t.insert_below(t.root(), "+").unwrap();
    t.insert_below(plus, "x").unwrap();
    t.insert_below(plus, "y").unwrap();
    assert_eq!(
        t.insert_below(plus, "z"),
        Err(TreeError::CapacityExceeded { max_arity: 2 })
    );
    assert_eq!(t.len(), 3);
}

#[test]
fn test_foreign_and_stale_cursors() {
    let mut a = tree_a();
    let b = tree_b();
    assert_eq!(a.insert_below(b.root(), "x"), Err(TreeError::ForeignCursor));

    let sin = child(&a, &[0]);
    let x = child(&a, &[0, 0]);
    a.erase(sin);
    assert!(a.at(x).invalid());
    assert_eq!(a.insert_below(x, "y"), Err(TreeError::StaleCursor));
}
