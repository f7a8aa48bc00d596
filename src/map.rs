use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::ptr::NonNull;

use crate::iter::{InOrder, PostOrder, PreOrder};

/// An ordered key/value map implemented with an AVL tree.
///
/// Keys are unique; inserting a key that is already present is rejected and
/// leaves the map unchanged. Every mutating operation restores the AVL
/// balance condition, so lookups, insertions and removals run in O(log n).
///
/// ```
/// use avlmap::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
pub struct AvlTreeMap<K: Ord, V> {
    pub(crate) root: Link<K, V>,
    pub(crate) num_nodes: usize,
}

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
    pub(crate) height: usize,
}

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;

/// Direction an iterative tree walk arrived at the current node from.
pub(crate) enum CameFrom {
    Parent,
    Left,
    Right,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Dir {
    Left,
    Right,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the tree height: -1 for an empty map, 0 for a single node.
    pub fn height(&self) -> isize {
        match self.root {
            None => -1,
            Some(root_ptr) => unsafe { root_ptr.as_ref().height as isize },
        }
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        // Iterative post-order walk; the parent link and child slot are
        // read before the node is freed, never after.
        unsafe {
            let mut current = self.root;
            let mut from = CameFrom::Parent;
            while let Some(node_ptr) = current {
                match from {
                    CameFrom::Parent => {
                        if let Some(left_ptr) = node_ptr.as_ref().left {
                            current = Some(left_ptr);
                        } else {
                            from = CameFrom::Left;
                        }
                    }
                    CameFrom::Left => {
                        if let Some(right_ptr) = node_ptr.as_ref().right {
                            current = Some(right_ptr);
                            from = CameFrom::Parent;
                        } else {
                            from = CameFrom::Right;
                        }
                    }
                    CameFrom::Right => {
                        let parent = node_ptr.as_ref().parent;
                        if let Some(parent_ptr) = parent {
                            from = if parent_ptr.as_ref().left == Some(node_ptr) {
                                CameFrom::Left
                            } else {
                                CameFrom::Right
                            };
                        }
                        Node::destroy(node_ptr);
                        current = parent;
                    }
                }
            }
        }
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key)
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node_ptr| {
            let node = unsafe { &*node_ptr.as_ptr() };
            (&node.key, &node.value)
        })
    }

    /// Returns true if the map contains the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    /// Returns false and leaves the map unchanged if the key is already
    /// present; the stored value is not overwritten.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let (parent, dir) = match self.find_insert_pos(&key) {
            Some(pos) => pos,
            None => return false,
        };
        let node_ptr = Node::create(parent, key, value);
        match parent {
            None => self.root = Some(node_ptr),
            Some(mut parent_ptr) => unsafe {
                match dir {
                    Dir::Left => parent_ptr.as_mut().left = Some(node_ptr),
                    Dir::Right => parent_ptr.as_mut().right = Some(node_ptr),
                }
            },
        }
        self.num_nodes += 1;
        self.rebalance_after_insert(parent);
        true
    }

    /// Removes a key from the map.
    /// Returns whether the key was previously in the map.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            None => false,
            Some(node_ptr) => {
                debug_assert!(self.num_nodes >= 1);
                self.unlink_node(node_ptr);
                unsafe { Node::destroy(node_ptr) };
                self.num_nodes -= 1;
                true
            }
        }
    }

    /// Collects the values in pre-order.
    pub fn to_vec(&self) -> Vec<&V> {
        self.preorder().map(|(_, value)| value).collect()
    }

    /// Gets an iterator over the key-value pairs of the map in ascending
    /// key order. Same as [`inorder`](Self::inorder).
    pub fn iter(&self) -> InOrder<'_, K, V> {
        self.inorder()
    }

    /// Gets a lazy in-order (left, node, right) traversal iterator.
    pub fn inorder(&self) -> InOrder<'_, K, V> {
        InOrder::new(self)
    }

    /// Gets a lazy pre-order (node, left, right) traversal iterator.
    pub fn preorder(&self) -> PreOrder<'_, K, V> {
        PreOrder::new(self)
    }

    /// Gets a lazy post-order (left, right, node) traversal iterator.
    pub fn postorder(&self) -> PostOrder<'_, K, V> {
        PostOrder::new(self)
    }

    /// Checks the AVL condition at every node of the tree.
    ///
    /// Verification helper, O(n). Insert and remove keep the tree balanced
    /// on their own; this is for diagnostics and tests.
    pub fn is_balanced(&self) -> bool {
        Self::is_balanced_at(self.root)
    }

    fn is_balanced_at(link: Link<K, V>) -> bool {
        match link {
            None => true,
            Some(node_ptr) => unsafe {
                let left = node_ptr.as_ref().left;
                let right = node_ptr.as_ref().right;
                Self::subtree_height(left).abs_diff(Self::subtree_height(right)) <= 1
                    && Self::is_balanced_at(left)
                    && Self::is_balanced_at(right)
            },
        }
    }

    /// Asserts that the internal tree structure is consistent: BST order,
    /// parent back-references, cached heights, the AVL condition and the
    /// node count. Panics on any violation.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        match self.root {
            None => assert_eq!(self.num_nodes, 0),
            Some(root_ptr) => unsafe {
                assert!(root_ptr.as_ref().parent.is_none());
                assert_eq!(Self::check_subtree(root_ptr), self.num_nodes);
            },
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    unsafe fn check_subtree(node_ptr: NodePtr<K, V>) -> usize {
        let node = node_ptr.as_ref();
        let mut num_nodes = 1;

        if let Some(left_ptr) = node.left {
            assert!(left_ptr.as_ref().parent == Some(node_ptr));
            assert!(left_ptr.as_ref().key < node.key);
            num_nodes += Self::check_subtree(left_ptr);
        }
        if let Some(right_ptr) = node.right {
            assert!(right_ptr.as_ref().parent == Some(node_ptr));
            assert!(right_ptr.as_ref().key > node.key);
            num_nodes += Self::check_subtree(right_ptr);
        }

        let left_height = Self::subtree_height(node.left);
        let right_height = Self::subtree_height(node.right);
        assert_eq!(node.height, cmp::max(left_height, right_height));
        assert!(left_height <= right_height + 1);
        assert!(right_height <= left_height + 1);

        num_nodes
    }

    fn find<Q>(&self, key: &Q) -> Link<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        current
    }

    /// Descends as in search, remembering the last visited node as the
    /// would-be parent. Returns None if the key is already present.
    fn find_insert_pos(&self, key: &K) -> Option<(Link<K, V>, Dir)> {
        let mut parent = None;
        let mut dir = Dir::Left;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            match key.cmp(&node.key) {
                Ordering::Equal => return None,
                Ordering::Less => {
                    parent = Some(node_ptr);
                    dir = Dir::Left;
                    current = node.left;
                }
                Ordering::Greater => {
                    parent = Some(node_ptr);
                    dir = Dir::Right;
                    current = node.right;
                }
            }
        }
        Some((parent, dir))
    }

    /// Points the slot of `parent` that held `old` (or the root slot) at
    /// `new` and fixes `new`'s parent back-reference.
    fn relink(&mut self, parent: Link<K, V>, old: NodePtr<K, V>, new: Link<K, V>) {
        unsafe {
            match parent {
                None => self.root = new,
                Some(mut parent_ptr) => {
                    if parent_ptr.as_ref().left == Some(old) {
                        parent_ptr.as_mut().left = new;
                    } else {
                        parent_ptr.as_mut().right = new;
                    }
                }
            }
            if let Some(mut new_ptr) = new {
                new_ptr.as_mut().parent = parent;
            }
        }
    }

    /// Takes the node out of the tree structure without deallocating it.
    fn unlink_node(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            let parent = node_ptr.as_ref().parent;
            match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
                // Leaf: detach. Removing the last node resets the root here.
                (None, None) => {
                    self.relink(parent, node_ptr, None);
                    self.rebalance_after_remove(parent);
                }
                // One child: splice the child into the removed position.
                (Some(child_ptr), None) | (None, Some(child_ptr)) => {
                    self.relink(parent, node_ptr, Some(child_ptr));
                    self.rebalance_after_remove(parent);
                }
                // Two children: move the in-order successor into the
                // removed position, keeping the left subtree and the rest
                // of the right subtree in place.
                (Some(mut left_ptr), Some(mut right_ptr)) => {
                    let mut succ_parent_ptr = node_ptr;
                    let mut succ_ptr = right_ptr;
                    while let Some(next_ptr) = succ_ptr.as_ref().left {
                        succ_parent_ptr = succ_ptr;
                        succ_ptr = next_ptr;
                    }
                    debug_assert!(succ_ptr.as_ref().left.is_none());

                    if succ_parent_ptr == node_ptr {
                        // Successor is the removed node's own right child:
                        // it keeps its right subtree, so only the left side
                        // and the parent slot need fixing up.
                        succ_ptr.as_mut().left = Some(left_ptr);
                        left_ptr.as_mut().parent = Some(succ_ptr);
                        self.relink(parent, node_ptr, Some(succ_ptr));
                        self.rebalance_after_remove(Some(succ_ptr));
                    } else {
                        // Detach the successor (it has no left child), then
                        // let it adopt both subtrees of the removed node.
                        self.relink(Some(succ_parent_ptr), succ_ptr, succ_ptr.as_ref().right);
                        succ_ptr.as_mut().right = Some(right_ptr);
                        right_ptr.as_mut().parent = Some(succ_ptr);
                        succ_ptr.as_mut().left = Some(left_ptr);
                        left_ptr.as_mut().parent = Some(succ_ptr);
                        succ_ptr.as_mut().height = node_ptr.as_ref().height;
                        self.relink(parent, node_ptr, Some(succ_ptr));
                        self.rebalance_after_remove(Some(succ_parent_ptr));
                    }
                }
            }
        }
    }

    /// Height of the subtree behind a child link: 0 for an absent subtree,
    /// the cached node height plus one otherwise.
    fn subtree_height(link: Link<K, V>) -> usize {
        match link {
            None => 0,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height + 1 },
        }
    }

    fn update_height(mut node_ptr: NodePtr<K, V>) {
        unsafe {
            node_ptr.as_mut().height = cmp::max(
                Self::subtree_height(node_ptr.as_ref().left),
                Self::subtree_height(node_ptr.as_ref().right),
            );
        }
    }

    /// Left rotation: the right child becomes the root of this subtree.
    /// Relinks at most three nodes and recomputes the two changed heights.
    fn rotate_left(&mut self, mut node_ptr: NodePtr<K, V>) {
        unsafe {
            let mut pivot_ptr = match node_ptr.as_ref().right {
                Some(right_ptr) => right_ptr,
                None => return,
            };

            node_ptr.as_mut().right = pivot_ptr.as_ref().left;
            if let Some(mut inner_ptr) = pivot_ptr.as_ref().left {
                inner_ptr.as_mut().parent = Some(node_ptr);
            }

            let parent = node_ptr.as_ref().parent;
            self.relink(parent, node_ptr, Some(pivot_ptr));

            pivot_ptr.as_mut().left = Some(node_ptr);
            node_ptr.as_mut().parent = Some(pivot_ptr);

            Self::update_height(node_ptr);
            Self::update_height(pivot_ptr);
        }
    }

    /// Right rotation, mirror of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, mut node_ptr: NodePtr<K, V>) {
        unsafe {
            let mut pivot_ptr = match node_ptr.as_ref().left {
                Some(left_ptr) => left_ptr,
                None => return,
            };

            node_ptr.as_mut().left = pivot_ptr.as_ref().right;
            if let Some(mut inner_ptr) = pivot_ptr.as_ref().right {
                inner_ptr.as_mut().parent = Some(node_ptr);
            }

            let parent = node_ptr.as_ref().parent;
            self.relink(parent, node_ptr, Some(pivot_ptr));

            pivot_ptr.as_mut().right = Some(node_ptr);
            node_ptr.as_mut().parent = Some(pivot_ptr);

            Self::update_height(node_ptr);
            Self::update_height(pivot_ptr);
        }
    }

    /// Walks from `start` up to the root, recomputing heights, until the
    /// first rotation. A single rotation always restores balance after an
    /// insert.
    fn rebalance_after_insert(&mut self, start: Link<K, V>) {
        let mut current = start;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            if self.rebalance_node(node_ptr) {
                break;
            }
            current = parent;
        }
    }

    /// Walks from `start` up to the root, recomputing heights and rotating
    /// at every ancestor that has gone out of balance. A removal can
    /// propagate imbalance, so the walk never stops early.
    fn rebalance_after_remove(&mut self, start: Link<K, V>) {
        let mut current = start;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
    }

    /// Restores the AVL condition at the given node if necessary and
    /// adjusts its height. The initial imbalance must not exceed +2 or -2,
    /// which always holds after a single structural update one level
    /// below. Returns whether a rotation was performed.
    fn rebalance_node(&mut self, node_ptr: NodePtr<K, V>) -> bool {
        unsafe {
            let left_height = Self::subtree_height(node_ptr.as_ref().left);
            let right_height = Self::subtree_height(node_ptr.as_ref().right);
            debug_assert!(left_height <= right_height + 2);
            debug_assert!(right_height <= left_height + 2);
            if left_height > right_height + 1 {
                // Left-heavy. A right-heavy left child makes the chain
                // zig-zag: rotate the child left first, then this node
                // right (the left-right double rotation). A straight chain
                // needs the single right rotation only.
                let left_ptr = node_ptr.as_ref().left.unwrap();
                if Self::subtree_height(left_ptr.as_ref().right)
                    > Self::subtree_height(left_ptr.as_ref().left)
                {
                    self.rotate_left(left_ptr);
                }
                self.rotate_right(node_ptr);
                true
            } else if right_height > left_height + 1 {
                // Right-heavy, mirror cases (right-left and right-right).
                let right_ptr = node_ptr.as_ref().right.unwrap();
                if Self::subtree_height(right_ptr.as_ref().left)
                    > Self::subtree_height(right_ptr.as_ref().right)
                {
                    self.rotate_right(right_ptr);
                }
                self.rotate_left(node_ptr);
                true
            } else {
                Self::update_height(node_ptr);
                false
            }
        }
    }
}

impl<K: Ord, V> Drop for AvlTreeMap<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> Clone for AvlTreeMap<K, V> {
    fn clone(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    /// Builds a map from key-value pairs. Duplicate keys are rejected as
    /// in [`insert`](AvlTreeMap::insert): the first occurrence wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = InOrder<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Node<K, V> {
    fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(node_ptr: NodePtr<K, V>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }
}
