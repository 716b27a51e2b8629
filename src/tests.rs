use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn tree_of(keys: &[u32]) -> AvlTree<u32> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(key), "{key} inserted twice");
        tree.assert_invariants();
    }

    tree
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        assert!(tree.find(key), "{key} not found");
    }

    assert_eq!(tree.len(), keys.len());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

// Calls `f` with every permutation of `keys`.
fn for_each_permutation(keys: &mut Vec<u32>, k: usize, f: &mut impl FnMut(&[u32])) {
    if k == keys.len() {
        f(keys);
        return;
    }

    for i in k..keys.len() {
        keys.swap(k, i);
        for_each_permutation(keys, k + 1, f);
        keys.swap(k, i);
    }
}

#[test]
fn four_elems_find() {
    for_each_permutation(&mut vec![0, 1, 2, 3], 0, &mut |keys| insert_find_all(keys));
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        assert!(tree.remove(key), "{key} not removed");
        assert!(!tree.find(key));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert!(tree.remove(key), "{key} not removed");
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    for_each_permutation(&mut vec![0, 1, 2, 3], 0, &mut |keys| insert_remove_all(keys));
}

#[test]
fn remove_six() {
    for_each_permutation(&mut vec![0, 1, 2, 3, 4, 5], 0, &mut |keys| {
        insert_remove_all(keys)
    });
}

#[test]
fn right_right_rotation() {
    let tree = tree_of(&[10, 20, 30]);

    assert_eq!(tree.preorder(), ["20(0)", "10(0)", "30(0)"]);
}

#[test]
fn left_left_rotation() {
    let tree = tree_of(&[30, 20, 10]);

    assert_eq!(tree.preorder(), ["20(0)", "10(0)", "30(0)"]);
}

#[test]
fn left_right_rotation() {
    let tree = tree_of(&[30, 10, 20]);

    assert_eq!(tree.preorder(), ["20(0)", "10(0)", "30(0)"]);
}

#[test]
fn right_left_rotation() {
    let tree = tree_of(&[10, 30, 20]);

    assert_eq!(tree.preorder(), ["20(0)", "10(0)", "30(0)"]);
}

#[test]
fn left_right_rotation_of_left_heavy_node() {
    let tree = tree_of(&[20, 10, 30, 5, 15, 12]);

    assert_eq!(
        tree.preorder(),
        ["15(0)", "10(0)", "5(0)", "12(0)", "20(-1)", "30(0)"]
    );
}

#[test]
fn right_left_rotation_of_right_heavy_node() {
    let tree = tree_of(&[10, 5, 20, 15, 25, 17]);

    assert_eq!(
        tree.preorder(),
        ["15(0)", "10(1)", "5(0)", "20(0)", "17(0)", "25(0)"]
    );
}

#[test]
fn perfect_tree() {
    let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    assert_eq!(
        tree.preorder(),
        ["4(0)", "2(0)", "1(0)", "3(0)", "6(0)", "5(0)", "7(0)"]
    );
    assert_eq!(tree.height(), 3);
}

#[test]
fn remove_from_perfect_tree() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    assert!(tree.remove(&1));
    tree.assert_invariants();
    assert_eq!(
        tree.inorder(),
        ["2(-1)", "3(0)", "4(0)", "5(0)", "6(0)", "7(0)"]
    );
    assert_eq!(
        tree.preorder(),
        ["4(0)", "2(-1)", "3(0)", "6(0)", "5(0)", "7(0)"]
    );

    assert!(tree.remove(&3));
    tree.assert_invariants();
    assert_eq!(tree.preorder(), ["4(-1)", "2(0)", "6(0)", "5(0)", "7(0)"]);

    // `4` is left with an empty left subtree and a balanced right child.
    assert!(tree.remove(&2));
    tree.assert_invariants();
    assert_eq!(tree.preorder(), ["6(1)", "4(-1)", "5(0)", "7(0)"]);
}

#[test]
fn remove_with_double_rotation() {
    let mut tree = tree_of(&[2, 1, 4, 3]);
    assert_eq!(tree.preorder(), ["2(-1)", "1(0)", "4(1)", "3(0)"]);

    assert!(tree.remove(&1));
    tree.assert_invariants();
    assert_eq!(tree.preorder(), ["3(0)", "2(0)", "4(0)"]);
}

#[test]
fn remove_rotates_at_every_level() {
    // A minimal AVL tree of height 5, built level by level so that no insertion rotates.
    let mut tree = tree_of(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
    assert_eq!(
        tree.preorder(),
        [
            "8(1)", "5(1)", "3(1)", "2(1)", "1(0)", "4(0)", "7(1)", "6(0)", "11(1)", "10(1)",
            "9(0)", "12(0)"
        ]
    );

    // Shrinks `11`, which rotates and shrinks in turn, which unbalances the root.
    assert!(tree.remove(&12));
    tree.assert_invariants();
    assert_eq!(
        tree.preorder(),
        ["5(0)", "3(1)", "2(1)", "1(0)", "4(0)", "8(0)", "7(1)", "6(0)", "10(0)", "9(0)", "11(0)"]
    );
}

#[test]
fn remove_node_with_two_children_uses_predecessor() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    assert_eq!(tree.take(&4), Some(4));
    tree.assert_invariants();

    // The predecessor `3` takes the place of the root.
    assert_eq!(tree.preorder()[0], "3(0)");
    assert_eq!(
        tree.inorder(),
        ["1(0)", "2(1)", "3(0)", "5(0)", "6(0)", "7(0)"]
    );
}

#[test]
fn insert_then_remove_single_key() {
    let mut tree: AvlTree<String> = AvlTree::new();

    assert!(tree.insert("x".to_string()));
    assert!(tree.remove("x"));

    assert!(tree.is_empty());
    assert!(!tree.find("x"));
    assert_eq!(tree.minimum(), Err(Error::EmptyTree));
    assert_eq!(tree.maximum(), Err(Error::EmptyTree));
    assert!(tree.preorder().is_empty());
    assert!(tree.inorder().is_empty());
}

#[test]
fn remove_from_empty_tree() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    assert!(!tree.remove(&1));
    assert_eq!(tree.take(&1), None);
    assert!(tree.is_empty());
    assert_eq!(tree.nodes.len(), 0);
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut tree = tree_of(&[5, 3, 8]);
    let before = tree.preorder();

    assert!(!tree.insert(3));
    assert_eq!(tree.preorder(), before);
    assert_eq!(tree.len(), 3);
}

#[test]
fn minimum_and_maximum() {
    let tree = tree_of(&[50, 20, 80, 10, 30, 90]);

    assert_eq!(tree.minimum(), Ok(&10));
    assert_eq!(tree.maximum(), Ok(&90));
}

#[test]
fn clear_frees_every_node() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    tree.clear();
    tree.assert_invariants();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert!(!tree.find(&4));

    // The tree is usable again afterwards.
    assert!(tree.insert(4));
    tree.assert_invariants();
    assert_eq!(tree.preorder(), ["4(0)"]);
}

#[test]
fn labels_carry_keys_and_balances() {
    let tree = tree_of(&[2, 1]);
    let labels = tree.preorder_labels();

    assert_eq!(labels.len(), 2);
    assert_eq!((*labels[0].key(), labels[0].balance()), (2, 1));
    assert_eq!((*labels[1].key(), labels[1].balance()), (1, 0));
    assert_eq!(labels[0].to_string(), "2(1)");
}

#[test]
fn debug_lists_keys_in_order() {
    let tree: AvlTree<u32> = [3, 1, 2].into_iter().collect();

    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

// Keys `2, 4, ..., 2^(depth + 1) - 2` in level order, which form a perfect tree.
fn perfect_keys(depth: u32) -> Vec<u32> {
    let mut keys = Vec::new();

    for level in 0..depth {
        let step = 1 << (depth - level);
        keys.extend((1..1 << (level + 1)).step_by(2).map(|i| i * step));
    }

    keys
}

#[test]
fn perfect_keys_form_perfect_tree() {
    for depth in 0..6 {
        let tree = tree_of(&perfect_keys(depth));

        assert_eq!(tree.len(), (1 << depth) - 1);
        assert_eq!(tree.height(), depth as usize);
        assert!(tree.preorder_labels().iter().all(|l| l.balance() == 0));
    }
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn height_is_logarithmic(keys in proptest::collection::btree_set(any::<u32>(), 0..2000)) {
        let tree: AvlTree<u32> = keys.iter().copied().collect();
        let n = tree.len() as f64;
        let bound = (1.44 * (n + 2.0).log2()).ceil() as usize;

        prop_assert!(tree.height() <= bound, "height {} exceeds {}", tree.height(), bound);
    }

    #[test]
    fn duplicate_insert_changes_nothing(
        keys in proptest::collection::vec(0u32..500, 1..200),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut tree: AvlTree<u32> = keys.iter().copied().collect();
        let before = tree.preorder();

        prop_assert!(!tree.insert(*pick.get(&keys)));
        prop_assert_eq!(tree.preorder(), before);
    }

    #[test]
    fn missing_remove_changes_nothing(
        keys in proptest::collection::vec(0u32..500, 0..200),
        missing in 500u32..1000,
    ) {
        let mut tree: AvlTree<u32> = keys.iter().copied().collect();
        let before = tree.preorder();

        prop_assert!(!tree.remove(&missing));
        prop_assert_eq!(tree.preorder(), before);
    }

    #[test]
    fn insert_remove_round_trip(depth in 0u32..7, fresh in any::<u32>()) {
        // Odd keys are never in a tree built from `perfect_keys`, and a perfect tree never
        // rotates on insertion.
        let mut tree = tree_of(&perfect_keys(depth));
        let fresh = fresh | 1;
        let inorder = tree.inorder();
        let preorder = tree.preorder();

        prop_assert!(tree.insert(fresh));
        tree.assert_invariants();
        prop_assert!(tree.remove(&fresh));
        tree.assert_invariants();

        prop_assert_eq!(tree.inorder(), inorder);
        prop_assert_eq!(tree.preorder(), preorder);
    }

    #[test]
    fn insert_remove_restores_keys(
        keys in proptest::collection::btree_set(0u32..1000, 0..300),
        fresh in 1000u32..2000,
    ) {
        let mut tree: AvlTree<u32> = keys.iter().copied().collect();

        prop_assert!(tree.insert(fresh));
        prop_assert!(tree.remove(&fresh));
        tree.assert_invariants();

        prop_assert!(keys.iter().eq(tree.inorder_labels().iter().map(|l| l.key())));
    }
}
