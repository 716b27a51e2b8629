use core::{
    fmt, mem,
    ops::{Index, IndexMut},
};

use crate::Dir;

/// Stable handle to a node slot in an [`Arena`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type Link = Option<NodeId>;

pub(crate) struct Node<K> {
    pub(crate) key: K,
    // height(left) - height(right)
    pub(crate) balance: i8,
    parent: Link,
    children: [Link; 2],
}

impl<K> Node<K> {
    pub(crate) const fn new(key: K, parent: Link) -> Node<K> {
        Node {
            key,
            balance: 0,
            parent,
            children: [None; 2],
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }
}

enum Slot<K> {
    Occupied(Node<K>),
    Vacant { next_free: Link },
}

/// Slot storage for tree nodes.
///
/// Freed slots are threaded onto a free list and handed out again by the next allocation, so a
/// `NodeId` stays valid exactly as long as the node it names.
pub(crate) struct Arena<K> {
    slots: Vec<Slot<K>>,
    next_free: Link,
    live: usize,
}

impl<K> Arena<K> {
    pub(crate) const fn new() -> Arena<K> {
        Arena {
            slots: Vec::new(),
            next_free: None,
            live: 0,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.live
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn alloc(&mut self, node: Node<K>) -> NodeId {
        self.live += 1;

        let Some(id) = self.next_free else {
            self.slots.push(Slot::Occupied(node));
            return NodeId(self.slots.len() - 1);
        };

        match mem::replace(&mut self.slots[id.0], Slot::Occupied(node)) {
            Slot::Vacant { next_free } => self.next_free = next_free,
            Slot::Occupied(_) => unreachable!("free list points at occupied slot {id:?}"),
        }

        id
    }

    /// Releases the slot named by `id`, returning its node.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already vacant.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K> {
        let vacant = Slot::Vacant {
            next_free: self.next_free,
        };

        match mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(node) => {
                self.next_free = Some(id);
                self.live -= 1;
                node
            }
            Slot::Vacant { .. } => panic!("double free of node {id:?}"),
        }
    }

    /// Drops every slot, occupied or not.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.next_free = None;
        self.live = 0;
    }
}

impl<K> Index<NodeId> for Arena<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node id {id:?}"),
        }
    }
}

impl<K> IndexMut<NodeId> for Arena<K> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node id {id:?}"),
        }
    }
}
