use core::fmt;

use crate::{arena::NodeId, AvlTree, Dir};

/// A read-only snapshot of one node: its key and balance factor.
///
/// Displays as `key(balance)`, e.g. `42(-1)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeLabel<'tree, K> {
    key: &'tree K,
    balance: i8,
}

impl<'tree, K> NodeLabel<'tree, K> {
    pub fn key(&self) -> &'tree K {
        self.key
    }

    /// Returns `height(left) - height(right)` of the labelled node.
    pub fn balance(&self) -> i8 {
        self.balance
    }
}

impl<K: fmt::Display> fmt::Display for NodeLabel<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.key, self.balance)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Order {
    Pre,
    In,
}

enum CameFrom {
    Parent,
    LeftChild,
    RightChild,
}

impl<K> AvlTree<K> {
    /// Returns the labels of all nodes in preorder (node, left subtree, right subtree).
    pub fn preorder_labels(&self) -> Vec<NodeLabel<'_, K>> {
        self.labels(Order::Pre)
    }

    /// Returns the labels of all nodes in key order.
    pub fn inorder_labels(&self) -> Vec<NodeLabel<'_, K>> {
        self.labels(Order::In)
    }

    fn labels(&self, order: Order) -> Vec<NodeLabel<'_, K>> {
        let nodes = &self.nodes;
        let mut labels = Vec::with_capacity(self.len());

        self.walk(order, |id| {
            let node = &nodes[id];
            labels.push(NodeLabel {
                key: &node.key,
                balance: node.balance,
            });
        });

        labels
    }

    // Visits every node in `order` without recursion, following parent links back up.
    pub(crate) fn walk(&self, order: Order, mut visit: impl FnMut(NodeId)) {
        let Some(mut cur) = self.root else {
            return;
        };

        let mut from = CameFrom::Parent;

        loop {
            match from {
                CameFrom::Parent => {
                    if order == Order::Pre {
                        visit(cur);
                    }

                    // Keep descending left; once there is no left child, that subtree is done.
                    match self.nodes[cur].left() {
                        Some(left) => cur = left,
                        None => from = CameFrom::LeftChild,
                    }
                }

                CameFrom::LeftChild => {
                    if order == Order::In {
                        visit(cur);
                    }

                    match self.nodes[cur].right() {
                        Some(right) => {
                            cur = right;
                            from = CameFrom::Parent;
                        }
                        None => from = CameFrom::RightChild,
                    }
                }

                CameFrom::RightChild => {
                    // The subtree rooted at `cur` is exhausted. Ascend one level.
                    let Some(parent) = self.nodes[cur].parent() else {
                        return;
                    };

                    from = match self.which_child(parent, cur) {
                        Dir::Left => CameFrom::LeftChild,
                        Dir::Right => CameFrom::RightChild,
                    };
                    cur = parent;
                }
            }
        }
    }
}

impl<K: fmt::Display> AvlTree<K> {
    /// Returns `key(balance)` descriptors of all nodes in preorder.
    ///
    /// Together with [`inorder`](Self::inorder) this fully determines the shape of the tree; see
    /// [`Shape::from_traversals`](crate::render::Shape::from_traversals).
    pub fn preorder(&self) -> Vec<String> {
        self.labels(Order::Pre)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Returns `key(balance)` descriptors of all nodes in key order.
    pub fn inorder(&self) -> Vec<String> {
        self.labels(Order::In)
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}
