//! An arena-backed AVL tree.

// Conventions used in comments:
// - The balance factor of a node `x` is `b(x) = h(left(x)) - h(right(x))`, where the height of a
//   missing subtree is 0.
// - `p(x)` is the parent of `x`, `gp(x)` its grandparent.
// - A node is `L`-heavy when `b(x) = +1` and `R`-heavy when `b(x) = -1`. `Dir::weight()` maps a
//   side to the balance factor of a node that is heavy on that side.
//
// The invariants of an AVL tree are:
// 1. For every node `x`, all keys of `left(x)` < key(x) < all keys of `right(x)`.
// 2. For every node `x`, `b(x) ∈ {-1, 0, +1}`.
//
// Every public operation preserves both, as well as the link invariant:
// 3. For every non-root node `x`, `x` is a child of `p(x)`; the root has no parent.
//
// Insertion raises the height of at most one path and needs at most one (single or double)
// rotation. Removal lowers the height of at most one path, but a rotation may itself lower the
// height of the rotated subtree, so removal may rotate at every level up to the root.

use core::{borrow::Borrow, cmp::Ordering, fmt, mem, ops::Not};

use log::{debug, trace};

mod arena;
mod error;
pub mod render;
mod traverse;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

use arena::{Arena, Link, Node, NodeId};

pub use error::{Error, Result};
pub use traverse::NodeLabel;

/// An ordered set of keys stored in an AVL tree.
///
/// Nodes live in an arena owned by the tree and refer to each other by index, so parent links are
/// plain handles rather than aliasing pointers.
pub struct AvlTree<K> {
    root: Link,
    nodes: Arena<K>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    /// The balance factor of a node whose `self` subtree is one level taller than the other.
    #[inline]
    const fn weight(self) -> i8 {
        match self {
            Dir::Left => 1,
            Dir::Right => -1,
        }
    }
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

// Where a key lives, or where it would be attached.
enum Position {
    Occupied(NodeId),
    Vacant(InsertAs),
}

enum InsertAs {
    Root,
    Child { parent: NodeId, dir: Dir },
}

impl<K> AvlTree<K> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K> {
        AvlTree {
            root: None,
            nodes: Arena::new(),
        }
    }

    /// Returns `true` if the tree contains no keys.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of keys in the tree.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of nodes on the longest root-to-leaf path, or 0 if the tree is empty.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, link: Link) -> usize {
        match link {
            Some(node) => {
                let node = &self.nodes[node];
                1 + self
                    .subtree_height(node.left())
                    .max(self.subtree_height(node.right()))
            }
            None => 0,
        }
    }

    /// Returns the minimum key of the tree.
    ///
    /// Fails with [`Error::EmptyTree`] if the tree has no keys.
    pub fn minimum(&self) -> Result<&K> {
        let root = self.root.ok_or(Error::EmptyTree)?;
        Ok(&self.nodes[self.extreme_in_subtree(root, Dir::Left)].key)
    }

    /// Returns the maximum key of the tree.
    ///
    /// Fails with [`Error::EmptyTree`] if the tree has no keys.
    pub fn maximum(&self) -> Result<&K> {
        let root = self.root.ok_or(Error::EmptyTree)?;
        Ok(&self.nodes[self.extreme_in_subtree(root, Dir::Right)].key)
    }

    // Descends from `root` in direction `dir` as far as possible.
    #[inline]
    fn extreme_in_subtree(&self, root: NodeId, dir: Dir) -> NodeId {
        let mut cur = root;

        while let Some(next) = self.nodes[cur].child(dir) {
            cur = next;
        }

        cur
    }

    /// Removes every key from the tree.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root.take();

        // Post-order teardown: a node is freed only once both of its subtrees are gone.
        while let Some(cur) = opt_cur {
            let node = &self.nodes[cur];

            if let Some(child) = node.left().or(node.right()) {
                opt_cur = Some(child);
                continue;
            }

            let parent = node.parent();
            if let Some(parent) = parent {
                let dir = self.which_child(parent, cur);
                self.nodes[parent].set_child(dir, None);
            }

            drop(self.nodes.free(cur));
            opt_cur = parent;
        }

        debug_assert_eq!(self.len(), 0);
        self.nodes.clear();
    }

    // Support methods ========================================================

    #[inline]
    fn parent(&self, node: NodeId) -> Link {
        self.nodes[node].parent()
    }

    #[inline]
    fn child(&self, node: NodeId, dir: Dir) -> Link {
        self.nodes[node].child(dir)
    }

    #[inline]
    fn balance(&self, node: NodeId) -> i8 {
        self.nodes[node].balance
    }

    #[inline]
    fn set_balance(&mut self, node: NodeId, balance: i8) {
        self.nodes[node].balance = balance;
    }

    pub(crate) fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.nodes[parent].left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                self.nodes[parent].right(),
                Some(child),
                "`child` must be a child of `parent`"
            );
            Dir::Right
        }
    }

    #[inline]
    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        if let Some(node) = opt_node {
            self.nodes[node].set_parent(parent);
        }
    }

    // Points whichever link referred to `old_child` (a child slot of `parent`, or the root) at
    // `new_child`.
    //
    // `new_child`'s parent link is not updated.
    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.nodes[parent].set_child(dir, new_child);
            }
            None => self.root = new_child,
        }
    }

    // Rotation engine ========================================================

    // Rotates the subtree rooted at `down` in direction `dir`: the `!dir` child of `down` takes its
    // place and `down` becomes that child's `dir` child.
    //
    //         p                     p
    //         |                     |
    //        down                   up
    //       /    \      (Left)     /  \
    //      A      up     ---->   down  C
    //            /  \           /   \
    //        across  C         A   across
    //
    // Balance factors are not updated. Returns the new subtree root, which is `down` itself if it
    // has no `!dir` child to rotate up.
    fn rotate(&mut self, down: NodeId, dir: Dir) -> NodeId {
        let Some(up) = self.child(down, !dir) else {
            return down;
        };

        trace!("rotating {dir:?} at {down:?}, raising {up:?}");

        let across = self.nodes[up].set_child(dir, Some(down));
        self.nodes[down].set_child(!dir, across);
        self.maybe_set_parent(across, Some(down));

        let parent = self.nodes[down].set_parent(Some(up));
        self.nodes[up].set_parent(parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        up
    }

    // Performs a double rotation at `top`, whose `heavy` child `mid` is heavy on the `!heavy` side.
    // The inner grandchild `low` becomes the subtree root with both balances fixed up:
    //
    //         top                       low
    //        /   \                    /     \
    //      mid    D                 mid     top
    //     /   \        (heavy =    /   \   /   \
    //    A    low       Left)     A     B C     D
    //        /   \      ---->
    //       B     C
    //
    // Returns `low`.
    fn rotate_twice(&mut self, top: NodeId, heavy: Dir) -> NodeId {
        let mid = self
            .child(top, heavy)
            .expect("double rotation requires a child on the heavy side");
        let low = self
            .child(mid, !heavy)
            .expect("double rotation requires an inner grandchild");

        // `mid` keeps the `heavy` half of `low`'s subtrees and `top` receives the other half, so
        // whichever of the two gets `low`'s shorter subtree ends up heavy on its outer side.
        let low_balance = self.balance(low);
        let (mid_balance, top_balance) = if low_balance == heavy.weight() {
            (0, (!heavy).weight())
        } else if low_balance == (!heavy).weight() {
            (heavy.weight(), 0)
        } else {
            (0, 0)
        };

        self.set_balance(mid, mid_balance);
        self.set_balance(top, top_balance);
        self.set_balance(low, 0);

        self.rotate(mid, heavy);
        self.rotate(top, !heavy)
    }
}

impl<K: Ord> AvlTree<K> {
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len(), 0, "an empty tree must not hold any nodes");
            return;
        };

        assert_eq!(self.parent(root), None, "the root must not have a parent");

        let (_height, count) = self.assert_invariants_at(root, None, None);
        assert_eq!(count, self.len(), "every allocated node must be reachable");
    }

    // Checks the subtree rooted at `node` against the AVL invariants, returning its height and
    // number of nodes. Every key in the subtree must lie strictly between `lower` and `upper`.
    fn assert_invariants_at<'a>(
        &'a self,
        node: NodeId,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
    ) -> (usize, usize) {
        let n = &self.nodes[node];

        if let Some(lower) = lower {
            assert!(*lower < n.key, "{node:?} is out of order with an ancestor");
        }

        if let Some(upper) = upper {
            assert!(n.key < *upper, "{node:?} is out of order with an ancestor");
        }

        let mut heights = [0usize; 2];
        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = n.child(dir) {
                // Ensure child's parent link points to this node.
                assert_eq!(
                    self.parent(child),
                    Some(node),
                    "parent link of {child:?} must point at {node:?}"
                );

                let (lower, upper) = match dir {
                    Dir::Left => (lower, Some(&n.key)),
                    Dir::Right => (Some(&n.key), upper),
                };

                let (height, child_count) = self.assert_invariants_at(child, lower, upper);
                heights[dir as usize] = height;
                count += child_count;
            }
        }

        let actual = heights[0] as isize - heights[1] as isize;
        assert!(
            (-1..=1).contains(&actual),
            "{node:?} is out of balance: left height {}, right height {}",
            heights[0],
            heights[1]
        );
        assert_eq!(
            isize::from(n.balance),
            actual,
            "stored balance of {node:?} disagrees with its subtree heights"
        );

        (1 + heights[0].max(heights[1]), count)
    }

    /// Returns `true` if the tree contains `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn find<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_some()
    }

    fn locate<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.position(key) {
            Position::Occupied(node) => Some(node),
            Position::Vacant(_) => None,
        }
    }

    fn position<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Position::Vacant(InsertAs::Root);
        };

        loop {
            let dir = match key.cmp(self.nodes[cur].key.borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Position::Occupied(cur),
                Ordering::Greater => Dir::Right,
            };

            match self.child(cur, dir) {
                Some(child) => cur = child,
                None => return Position::Vacant(InsertAs::Child { parent: cur, dir }),
            }
        }
    }

    /// Inserts `key` into the tree.
    ///
    /// Returns `false`, leaving the tree untouched, if the key is already present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K) -> bool {
        let insert_as = match self.position(&key) {
            Position::Occupied(existing) => {
                debug!("insert: key already present at {existing:?}");
                return false;
            }
            Position::Vacant(insert_as) => insert_as,
        };

        match insert_as {
            InsertAs::Root => {
                let node = self.nodes.alloc(Node::new(key, None));
                self.root = Some(node);
                debug!("insert: {node:?} is the new root");
            }

            InsertAs::Child { parent, dir } => {
                let node = self.nodes.alloc(Node::new(key, Some(parent)));
                self.nodes[parent].set_child(dir, Some(node));
                debug!("insert: {node:?} attached as {dir:?} child of {parent:?}");

                self.rebalance_inserted(node);
            }
        }

        true
    }

    // Performs a bottom-up rebalance of the tree after `node` was attached as a new leaf.
    //
    // Each iteration handles a subtree `node` whose height just grew by one:
    // - `p(node)` absorbs the growth if it becomes balanced; stop.
    // - Otherwise `p(node)` grew as well. If `gp(node)` was already heavy on `p(node)`'s side it
    //   would become ±2, so rotate there; the rotated subtree is back at its old height; stop.
    // - Otherwise ascend one level.
    fn rebalance_inserted(&mut self, node: NodeId) {
        let mut node = node;
        let Some(mut parent) = self.parent(node) else {
            return;
        };

        loop {
            let side = self.which_child(parent, node);
            let parent_balance = self.balance(parent) + side.weight();
            self.set_balance(parent, parent_balance);

            if parent_balance == 0 {
                trace!("insert: {parent:?} absorbed the growth");
                return;
            }

            let Some(grandparent) = self.parent(parent) else {
                return;
            };

            let parent_side = self.which_child(grandparent, parent);

            if self.balance(grandparent) == parent_side.weight() {
                if side == parent_side {
                    // LL or RR.
                    trace!("insert: single rotation at {grandparent:?}");
                    self.set_balance(parent, 0);
                    self.set_balance(grandparent, 0);
                    self.rotate(grandparent, !parent_side);
                } else {
                    // LR or RL.
                    trace!("insert: double rotation at {grandparent:?}");
                    self.rotate_twice(grandparent, parent_side);
                }

                return;
            }

            node = parent;
            parent = grandparent;
        }
    }

    /// Removes `key` from the tree.
    ///
    /// Returns `false`, leaving the tree untouched, if the key is not present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes `key` from the tree and returns the stored key, if any.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(node) = self.locate(key) else {
            debug!("remove: key not present");
            return None;
        };

        let removed = match (self.nodes[node].left(), self.nodes[node].right()) {
            (Some(left), Some(_)) => {
                // The predecessor has no right child, so it can be spliced out in place of `node`
                // once its key has been moved up.
                let predecessor = self.extreme_in_subtree(left, Dir::Right);
                let spliced = self.splice_out(predecessor);
                mem::replace(&mut self.nodes[node].key, spliced.key)
            }

            _ => self.splice_out(node).key,
        };

        Some(removed)
    }

    // Replaces `node`, which must have at most one child, by that child (if any), frees it and
    // rebalances the tree.
    fn splice_out(&mut self, node: NodeId) -> Node<K> {
        let (parent, left, right) = {
            let n = &self.nodes[node];
            (n.parent(), n.left(), n.right())
        };

        debug_assert!(
            left.is_none() || right.is_none(),
            "only nodes with at most one child can be spliced out"
        );
        let child = left.or(right);

        let shrunk = parent.map(|parent| (parent, self.which_child(parent, node)));

        self.replace_child_or_set_root(parent, node, child);
        self.maybe_set_parent(child, parent);

        let removed = self.nodes.free(node);
        debug!("remove: spliced out {node:?}");

        if let Some((parent, side)) = shrunk {
            self.rebalance_removed(parent, side);
        }

        removed
    }

    // Performs a bottom-up rebalance of the tree after the `side` subtree of `parent` lost one
    // level of height.
    //
    // Each iteration handles a `parent` whose `side` subtree just shrank:
    // - If `parent` was balanced it becomes heavy on the other side but keeps its height; stop.
    // - If `parent` was heavy on `side` it becomes balanced and shrinks too; ascend.
    // - If `parent` was heavy on the other side it is now ±2 and must be rotated. The case is
    //   chosen by the balance of the taller child. The rotated subtree keeps its height only when
    //   that child was balanced; otherwise it shrank and the walk continues above it.
    fn rebalance_removed(&mut self, parent: NodeId, side: Dir) {
        let mut parent = parent;
        let mut side = side;

        loop {
            let balance = self.balance(parent) - side.weight();
            self.set_balance(parent, balance);

            let shrunk = match balance {
                // Was balanced; the other side still holds the height.
                1 | -1 => {
                    trace!("remove: {parent:?} kept its height");
                    return;
                }

                // Was heavy on `side`; one level lower now.
                0 => parent,

                _ => {
                    let heavy = !side;
                    let tall = self
                        .child(parent, heavy)
                        .expect("an unbalanced node must have a child on its heavy side");
                    let tall_balance = self.balance(tall);

                    if tall_balance == 0 {
                        trace!("remove: single rotation at {parent:?}, height kept");
                        self.set_balance(tall, side.weight());
                        self.set_balance(parent, heavy.weight());
                        self.rotate(parent, side);
                        return;
                    } else if tall_balance == heavy.weight() {
                        trace!("remove: single rotation at {parent:?}");
                        self.set_balance(tall, 0);
                        self.set_balance(parent, 0);
                        self.rotate(parent, side)
                    } else {
                        trace!("remove: double rotation at {parent:?}");
                        self.rotate_twice(parent, heavy)
                    }
                }
            };

            let Some(up) = self.parent(shrunk) else {
                return;
            };

            side = self.which_child(up, shrunk);
            parent = up;
        }
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<K> Drop for AvlTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.inorder_labels().iter().map(NodeLabel::key))
            .finish()
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}
