//! An ordered key/value map implemented with an AVL tree.
//!
//! The tree rebalances itself on every insert and remove, keeping the
//! heights of any node's subtrees within one of each other: search,
//! insertion and removal run in O(log n). Traversals in all three
//! depth-first orders are lazy, allocation-free and restartable.
//!
//! ```
//! use avlmap::AvlTreeMap;
//!
//! let mut map = AvlTreeMap::new();
//! map.insert(2, "two");
//! map.insert(1, "one");
//! map.insert(3, "three");
//! assert_eq!(map.get(&2), Some(&"two"));
//! assert!(!map.insert(2, "again"));
//! map.remove(&2);
//! assert!(map.get(&2).is_none());
//! ```

mod debug;
mod iter;
mod map;

pub use iter::{InOrder, PostOrder, PreOrder};
pub use map::AvlTreeMap;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;
