//! Model-based checking of [`AvlTree`] against [`BTreeSet`].
//!
//! Shared by the unit tests (through `proptest`) and the fuzz targets (through `arbitrary`).

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Error};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Picks one of the keys currently in the tree, so that finds and removals hit.
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Find(ItemValue),
    Remove(ItemValue),
    Take(ItemValue),
    Minimum,
    Maximum,
    Clear,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Find(item) => FinalOp::Find(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::Take(item) => FinalOp::Take(get_value(sorted, item)),
            Op::Minimum => FinalOp::Minimum,
            Op::Maximum => FinalOp::Maximum,
            Op::Clear => FinalOp::Clear,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Find(u32),
    Remove(u32),
    Take(u32),
    Minimum,
    Maximum,
    Clear,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    // Clearing is kept rare so that sequences grow trees of interesting size.
    proptest::prop_oneof![
        8 => value_strategy().prop_map(Op::Insert),
        3 => value_strategy().prop_map(Op::Find),
        5 => value_strategy().prop_map(Op::Remove),
        2 => value_strategy().prop_map(Op::Take),
        1 => Just(Op::Minimum),
        1 => Just(Op::Maximum),
        1 => Just(Op::Clear),
    ]
}

/// Applies `ops` to both an [`AvlTree`] and a [`BTreeSet`], asserting after every step that they
/// agree and that the tree's invariants hold.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<u32> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_avl = avl.insert(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Find(value) => {
                let from_btree = btree.contains(&value);
                let from_avl = avl.find(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value);
                let from_avl = avl.remove(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Take(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.take(&value);
                let from_avl = avl.take(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Minimum => {
                let from_btree = btree.first().ok_or(Error::EmptyTree);
                let from_avl = avl.minimum();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Maximum => {
                let from_btree = btree.last().ok_or(Error::EmptyTree);
                let from_avl = avl.maximum();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Clear => {
                sorted_values.clear();
                btree.clear();
                avl.clear();
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree
            .iter()
            .eq(avl.inorder_labels().iter().map(|label| label.key())));
    }
}
