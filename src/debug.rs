use std::fmt;

use crate::map::{AvlTreeMap, Link};

impl<K, V> fmt::Debug for AvlTreeMap<K, V>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> AvlTreeMap<K, V>
where
    K: Ord + fmt::Debug,
{
    /// Writes an indented dump of the tree structure, one `-> key` line
    /// per node, four spaces of indent per level, the right subtree above
    /// its node and the left subtree below. For debugging only; the exact
    /// layout is not part of the crate's contract.
    pub fn write_tree<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        Self::write_subtree(w, self.root, 0)
    }

    /// Prints the tree structure to standard output.
    pub fn print_tree(&self) {
        struct Dump<'a, K: Ord + fmt::Debug, V>(&'a AvlTreeMap<K, V>);

        impl<K: Ord + fmt::Debug, V> fmt::Display for Dump<'_, K, V> {
            fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                self.0.write_tree(fmt)
            }
        }

        print!("{}", Dump(self));
    }

    fn write_subtree<W: fmt::Write>(w: &mut W, link: Link<K, V>, depth: usize) -> fmt::Result {
        if let Some(node_ptr) = link {
            let node = unsafe { &*node_ptr.as_ptr() };
            Self::write_subtree(w, node.right, depth + 1)?;
            writeln!(w, "{:indent$}-> {:?}", "", node.key, indent = 4 * depth)?;
            Self::write_subtree(w, node.left, depth + 1)?;
        }
        Ok(())
    }
}
