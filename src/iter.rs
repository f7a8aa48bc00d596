use std::marker::PhantomData;

use crate::map::{AvlTreeMap, CameFrom, Link, Node, NodePtr};

enum Visit {
    Pre,
    In,
    Post,
}

/// Iterative depth-first walk shared by all traversal orders.
///
/// Keeps no stack: it follows child links downward and parent links
/// upward, tagging each arrival with the direction it came from. Every
/// node is reported exactly once per visit kind, so a full walk takes 3n
/// steps in O(1) auxiliary space.
struct Walk<K, V> {
    current: Link<K, V>,
    from: CameFrom,
}

impl<K, V> Walk<K, V> {
    fn new(root: Link<K, V>) -> Self {
        Walk {
            current: root,
            from: CameFrom::Parent,
        }
    }

    fn step(&mut self) -> Option<(NodePtr<K, V>, Visit)> {
        let node_ptr = self.current?;
        unsafe {
            let visit = match self.from {
                CameFrom::Parent => {
                    if let Some(left_ptr) = node_ptr.as_ref().left {
                        self.current = Some(left_ptr);
                    } else {
                        self.from = CameFrom::Left;
                    }
                    Visit::Pre
                }
                CameFrom::Left => {
                    if let Some(right_ptr) = node_ptr.as_ref().right {
                        self.current = Some(right_ptr);
                        self.from = CameFrom::Parent;
                    } else {
                        self.from = CameFrom::Right;
                    }
                    Visit::In
                }
                CameFrom::Right => {
                    match node_ptr.as_ref().parent {
                        Some(parent_ptr) => {
                            self.from = if parent_ptr.as_ref().left == Some(node_ptr) {
                                CameFrom::Left
                            } else {
                                CameFrom::Right
                            };
                            self.current = Some(parent_ptr);
                        }
                        None => self.current = None,
                    }
                    Visit::Post
                }
            };
            Some((node_ptr, visit))
        }
    }
}

/// A lazy in-order (left, node, right) traversal of a map.
/// Yields key-value pairs in ascending key order.
pub struct InOrder<'a, K, V> {
    walk: Walk<K, V>,
    remaining: usize,
    marker: PhantomData<&'a Node<K, V>>,
}

/// A lazy pre-order (node, left, right) traversal of a map.
pub struct PreOrder<'a, K, V> {
    walk: Walk<K, V>,
    remaining: usize,
    marker: PhantomData<&'a Node<K, V>>,
}

/// A lazy post-order (left, right, node) traversal of a map.
pub struct PostOrder<'a, K, V> {
    walk: Walk<K, V>,
    remaining: usize,
    marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K: Ord, V> InOrder<'a, K, V> {
    pub(crate) fn new(map: &'a AvlTreeMap<K, V>) -> Self {
        InOrder {
            walk: Walk::new(map.root),
            remaining: map.num_nodes,
            marker: PhantomData,
        }
    }
}

impl<'a, K: Ord, V> PreOrder<'a, K, V> {
    pub(crate) fn new(map: &'a AvlTreeMap<K, V>) -> Self {
        PreOrder {
            walk: Walk::new(map.root),
            remaining: map.num_nodes,
            marker: PhantomData,
        }
    }
}

impl<'a, K: Ord, V> PostOrder<'a, K, V> {
    pub(crate) fn new(map: &'a AvlTreeMap<K, V>) -> Self {
        PostOrder {
            walk: Walk::new(map.root),
            remaining: map.num_nodes,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for InOrder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node_ptr, visit) = self.walk.step()?;
            if let Visit::In = visit {
                self.remaining -= 1;
                let node = unsafe { &*node_ptr.as_ptr() };
                return Some((&node.key, &node.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> Iterator for PreOrder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node_ptr, visit) = self.walk.step()?;
            if let Visit::Pre = visit {
                self.remaining -= 1;
                let node = unsafe { &*node_ptr.as_ptr() };
                return Some((&node.key, &node.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> Iterator for PostOrder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node_ptr, visit) = self.walk.step()?;
            if let Visit::Post = visit {
                self.remaining -= 1;
                let node = unsafe { &*node_ptr.as_ptr() };
                return Some((&node.key, &node.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for InOrder<'_, K, V> {}
impl<K, V> ExactSizeIterator for PreOrder<'_, K, V> {}
impl<K, V> ExactSizeIterator for PostOrder<'_, K, V> {}
