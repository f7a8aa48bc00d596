use proptest::prelude::*;

use super::model;
use super::AvlTreeMap;

const N: i32 = 1_000;
const LARGE_N: i32 = 1_000_000;

#[test]
fn test_new() {
    let map_i32 = AvlTreeMap::<i32, ()>::new();
    assert!(map_i32.is_empty());
    assert_eq!(map_i32.len(), 0);
    assert_eq!(map_i32.height(), -1);
    assert!(map_i32.is_balanced());
    map_i32.check_consistency();

    let map_i8 = AvlTreeMap::<i8, ()>::new();
    assert!(map_i8.is_empty());
    map_i8.check_consistency();

    let map_string = AvlTreeMap::<String, String>::new();
    assert!(map_string.is_empty());
    map_string.check_consistency();
}

#[test]
fn test_rebalance() {
    {
        //     3 ->   2
        //    /      / \
        //   2      1   3
        //  /
        // 1
        let mut map = AvlTreeMap::new();
        map.insert(3, ());
        map.insert(2, ());
        map.insert(1, ());
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        //     3   ->     3 ->   2
        //    / \        /      / \
        //   2   4      2      1   3
        //  /          /
        // 1          1
        let mut map = AvlTreeMap::new();
        map.insert(3, ());
        map.insert(2, ());
        map.insert(4, ());
        map.insert(1, ());
        map.check_consistency();
        assert_eq!(map.height(), 2);
        map.remove(&4);
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        //   3  ->   2
        //  /       / \
        // 1       1   3
        //  \
        //   2
        let mut map = AvlTreeMap::new();
        map.insert(3, ());
        map.insert(1, ());
        map.insert(2, ());
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        //   3   ->   3  ->   2
        //  / \      /       / \
        // 1   4    1       1   3
        //  \        \
        //   2        2
        let mut map = AvlTreeMap::new();
        map.insert(3, ());
        map.insert(1, ());
        map.insert(4, ());
        map.insert(2, ());
        map.check_consistency();
        assert_eq!(map.height(), 2);
        map.remove(&4);
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        // 1 ->    2
        //  \     / \
        //   2   1   3
        //    \
        //     3
        let mut map = AvlTreeMap::new();
        map.insert(1, ());
        map.insert(2, ());
        map.insert(3, ());
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        //   1     -> 1     ->    2
        //  / \        \         / \
        // 0   2        2       1   3
        //      \        \
        //       3        3
        let mut map = AvlTreeMap::new();
        map.insert(1, ());
        map.insert(0, ());
        map.insert(2, ());
        map.insert(3, ());
        map.check_consistency();
        assert_eq!(map.height(), 2);
        map.remove(&0);
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        // 1   ->  2
        //  \     / \
        //   3   1   3
        //  /
        // 2
        let mut map = AvlTreeMap::new();
        map.insert(1, ());
        map.insert(3, ());
        map.insert(2, ());
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
    {
        //   1   ->  1   ->  2
        //  / \       \     / \
        // 0   3       3   1   3
        //    /       /
        //   2       2
        let mut map = AvlTreeMap::new();
        map.insert(1, ());
        map.insert(0, ());
        map.insert(3, ());
        map.insert(2, ());
        map.check_consistency();
        assert_eq!(map.height(), 2);
        map.remove(&0);
        map.check_consistency();
        assert_eq!(map.height(), 1);
    }
}

#[test]
fn test_insert() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();
    values.sort();
    values.dedup();

    let mut map = AvlTreeMap::new();
    for value in &values {
        assert!(map.insert(*value, *value));
        map.check_consistency();
    }
    assert!(map.len() == values.len());

    for value in &values {
        assert!(!map.insert(*value, *value));
    }
    assert!(map.len() == values.len());
}

#[test]
fn test_insert_sorted_range() {
    let mut map = AvlTreeMap::new();
    for value in 0..N {
        assert!(map.insert(value, value));
        map.check_consistency();
    }
    assert!(map.len() == N as usize);
    assert!(map.height() > 0);
    assert!(map.height() < N as isize / 2);
    assert!(map.get(&-42).is_none());
}

#[test]
fn test_insert_shuffled_range() {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    let mut values: Vec<i32> = (0..N).collect();
    let mut rng = StdRng::seed_from_u64(0);
    values.shuffle(&mut rng);

    let mut map = AvlTreeMap::new();
    for value in &values {
        assert!(map.insert(*value, "foo"));
        map.check_consistency();
    }
    assert!(map.len() == values.len());

    for value in &values {
        assert!(!map.insert(*value, "bar"));
    }
    assert!(map.len() == values.len());
    assert_eq!(map.get(&0), Some(&"foo"));
}

#[test]
fn test_get() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();

    let mut map = AvlTreeMap::new();
    assert!(map.get(&42).is_none());
    for value in &values {
        map.insert(*value, value.wrapping_add(1));
    }

    for value in &values {
        assert_eq!(map.get(value), Some(&value.wrapping_add(1)));
        assert_eq!(map.get_key_value(value), Some((value, &value.wrapping_add(1))));
        assert!(map.contains_key(value));
    }
}

#[test]
fn test_clear() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();
    values.sort();
    values.dedup();

    let mut map = AvlTreeMap::new();
    for value in &values {
        map.insert(*value, String::from("foo"));
    }
    assert!(!map.is_empty());
    assert!(map.len() == values.len());

    map.clear();
    assert!(map.is_empty());
    assert!(map.len() == 0);
    assert_eq!(map.height(), -1);

    for value in &values {
        assert!(map.insert(*value, String::from("bar")));
    }
    assert!(!map.is_empty());
    assert!(map.len() == values.len());
    map.check_consistency();
}

#[test]
fn test_remove() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();
    values.sort();
    values.dedup();

    let mut map = AvlTreeMap::new();
    for value in &values {
        map.insert(*value, 42);
    }

    values.shuffle(&mut rng);
    for value in &values {
        assert!(map.get(value).is_some());
        assert!(map.remove(value));
        assert!(map.get(value).is_none());
        map.check_consistency();
    }
    assert!(map.is_empty());
    assert!(map.len() == 0);
}

#[test]
fn test_remove_missing() {
    let mut map = AvlTreeMap::<i32, i32>::new();
    assert!(!map.remove(&1));

    map.insert(1, 10);
    map.insert(2, 20);
    assert!(!map.remove(&3));
    assert_eq!(map.len(), 2);
    map.check_consistency();
}

#[test]
fn test_height_conventions() {
    let mut map = AvlTreeMap::new();
    assert_eq!(map.height(), -1);

    map.insert(1, ());
    assert_eq!(map.height(), 0);

    map.insert(2, ());
    assert_eq!(map.height(), 1);

    map.remove(&2);
    assert_eq!(map.height(), 0);

    map.remove(&1);
    assert_eq!(map.height(), -1);
}

// Classic textbook sequence: the last insert forces a left-right double
// rotation and the tree must come out height-balanced with this shape:
//
//         44
//        /  \
//      17    62
//        \   / \
//        32 50  78
//           / \   \
//          48 54  88
#[test]
fn test_balanced_insert_sequence() {
    let keys = [44, 17, 78, 32, 50, 88, 48, 62, 54];

    let mut map = AvlTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        assert!(map.insert(*key, index));
        map.check_consistency();
    }

    assert_eq!(map.len(), 9);
    assert_eq!(map.height(), 3);
    assert!(map.is_balanced());

    let inorder_keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
    assert_eq!(inorder_keys, vec![17, 32, 44, 48, 50, 54, 62, 78, 88]);

    // Pre-order over the shape above, as insertion indices.
    assert_eq!(map.to_vec(), vec![&0, &1, &3, &7, &4, &6, &8, &2, &5]);
}

#[test]
fn test_duplicate_key_rejected() {
    let keys = [44, 17, 78, 32, 50, 88, 48, 62, 54, 20, 13, 24, 5];

    let mut map = AvlTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        assert!(map.insert(*key, index));
        map.check_consistency();
    }
    assert_eq!(map.len(), 13);

    // The duplicate is rejected and changes nothing, not even the value.
    assert!(!map.insert(17, 999));
    assert_eq!(map.len(), 13);
    assert_eq!(map.get(&17), Some(&1));
    map.check_consistency();

    for key in [22, 26, 21, 25] {
        assert!(map.insert(key, 0));
        map.check_consistency();
    }
    assert_eq!(map.len(), 17);
    assert!(map.is_balanced());
}

#[test]
fn test_remove_root_with_single_child() {
    let mut map = AvlTreeMap::new();
    map.insert(5, "a");
    map.insert(3, "b");

    assert!(map.remove(&5));
    map.check_consistency();

    assert_eq!(map.len(), 1);
    assert_eq!(map.height(), 0);
    assert!(map.get(&5).is_none());
    assert_eq!(map.get(&3), Some(&"b"));
    let keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, vec![3]);
}

#[test]
fn test_remove_node_with_two_children() {
    let keys = [44, 17, 78, 32, 50, 88, 48, 62, 54];

    // Successor is the removed node's direct right child (62 -> 78).
    let mut map = AvlTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        map.insert(*key, index);
    }
    assert!(map.remove(&62));
    map.check_consistency();
    assert!(map.is_balanced());
    assert_eq!(map.len(), 8);
    let inorder_keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
    assert_eq!(inorder_keys, vec![17, 32, 44, 48, 50, 54, 78, 88]);

    // Successor is further down the right subtree (44 -> 48).
    let mut map = AvlTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        map.insert(*key, index);
    }
    assert!(map.remove(&44));
    map.check_consistency();
    assert!(map.is_balanced());
    assert_eq!(map.len(), 8);
    let inorder_keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
    assert_eq!(inorder_keys, vec![17, 32, 48, 50, 54, 62, 78, 88]);
}

#[test]
fn test_traversal_orders() {
    let map = AvlTreeMap::<i32, ()>::new();
    assert!(map.inorder().next().is_none());
    assert!(map.preorder().next().is_none());
    assert!(map.postorder().next().is_none());

    //   2
    //  / \
    // 1   3
    let mut map = AvlTreeMap::new();
    map.insert(2, "two");
    map.insert(1, "one");
    map.insert(3, "three");

    let inorder: Vec<i32> = map.inorder().map(|(key, _)| *key).collect();
    assert_eq!(inorder, vec![1, 2, 3]);

    let preorder: Vec<i32> = map.preorder().map(|(key, _)| *key).collect();
    assert_eq!(preorder, vec![2, 1, 3]);

    let postorder: Vec<i32> = map.postorder().map(|(key, _)| *key).collect();
    assert_eq!(postorder, vec![1, 3, 2]);

    // Traversals are restartable and independent of each other.
    let again: Vec<i32> = map.preorder().map(|(key, _)| *key).collect();
    assert_eq!(again, preorder);

    assert_eq!(map.inorder().len(), 3);
    let mut iter = map.postorder();
    iter.next();
    assert_eq!(iter.len(), 2);
}

#[test]
fn test_iter_sorted() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();

    let mut map = AvlTreeMap::new();
    for value in &values {
        map.insert(*value, value.wrapping_add(42));
    }

    values.sort();
    values.dedup();

    let mut map_iter = map.iter();
    for value in &values {
        let (&key, &mapped) = map_iter.next().unwrap();
        assert_eq!(key, *value);
        assert_eq!(mapped, value.wrapping_add(42));
    }
    assert!(map_iter.next().is_none());

    let mut value_iter = values.iter();
    for (&key, &mapped) in &map {
        let value = value_iter.next().unwrap();
        assert_eq!(key, *value);
        assert_eq!(mapped, value.wrapping_add(42));
    }
    assert!(value_iter.next().is_none());
}

#[test]
fn test_to_vec_preorder() {
    let mut map = AvlTreeMap::new();
    assert!(map.to_vec().is_empty());

    map.insert(2, "b");
    map.insert(1, "a");
    map.insert(3, "c");
    assert_eq!(map.to_vec(), vec![&"b", &"a", &"c"]);
}

#[test]
fn test_write_tree() {
    let mut map = AvlTreeMap::new();
    map.insert(2, ());
    map.insert(1, ());
    map.insert(3, ());

    let mut rendered = String::new();
    map.write_tree(&mut rendered).unwrap();
    assert_eq!(rendered, "    -> 3\n-> 2\n    -> 1\n");

    let empty = AvlTreeMap::<i32, ()>::new();
    let mut rendered = String::new();
    empty.write_tree(&mut rendered).unwrap();
    assert!(rendered.is_empty());
}

#[test]
fn test_clone_and_from_iter() {
    let map: AvlTreeMap<i32, &str> =
        [(2, "two"), (1, "one"), (3, "three"), (1, "dup")].into_iter().collect();
    assert_eq!(map.len(), 3);
    // First occurrence wins on duplicate keys.
    assert_eq!(map.get(&1), Some(&"one"));

    let mut copy = map.clone();
    copy.check_consistency();
    assert_eq!(copy.len(), map.len());
    assert_eq!(copy.get(&2), Some(&"two"));

    copy.remove(&2);
    assert_eq!(copy.len(), 2);
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&2), Some(&"two"));
}

#[test]
#[ignore]
fn test_large() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..LARGE_N).map(|_| rng.gen_range(0..LARGE_N)).collect();

    let mut map = AvlTreeMap::new();
    for value in &values {
        map.insert(*value, *value);
    }
    map.check_consistency();

    values.shuffle(&mut rng);
    values.resize(values.len() / 2, 0);
    for value in &values {
        map.remove(value);
    }
    map.check_consistency();
}

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), 0..300)) {
        model::run_btree_equivalence(ops);
    }
}
