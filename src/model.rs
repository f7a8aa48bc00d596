//! Model-based testing support: drives a map and a [`BTreeMap`] in
//! lockstep through arbitrary op sequences, asserting observable
//! equivalence and internal consistency after every op.
//!
//! Used by the proptest suite and by the fuzz targets (which is why the
//! op types derive [`Arbitrary`]).

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use proptest::strategy::Strategy;

use crate::AvlTreeMap;

/// A key pick: either an index into the keys currently stored (likely to
/// hit) or a raw key value (likely to miss).
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum KeyPick {
    Present(usize),
    Random(u32),
}

impl KeyPick {
    fn resolve(self, keys: &[u32]) -> u32 {
        match self {
            KeyPick::Present(index) => {
                if keys.is_empty() {
                    index as u32
                } else {
                    keys[index % keys.len()]
                }
            }
            KeyPick::Random(key) => key,
        }
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(KeyPick),
    Get(KeyPick),
    Remove(KeyPick),
}

proptest::prop_compose! {
    fn present_strategy()(index in 0usize..1000) -> KeyPick {
        KeyPick::Present(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(key in 0u32..1000) -> KeyPick {
        KeyPick::Random(key)
    }
}

fn key_strategy() -> impl Strategy<Value = KeyPick> {
    proptest::prop_oneof![present_strategy(), random_strategy()]
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        key_strategy().prop_map(Op::Insert),
        key_strategy().prop_map(Op::Get),
        key_strategy().prop_map(Op::Remove),
    ]
}

/// Runs an op sequence against the map and a [`BTreeMap`], asserting that
/// both report the same results and that the tree invariants hold after
/// every op. Inserted values are op indices, so a lost or wrongly
/// overwritten value shows up as an equivalence failure later on.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut keys: Vec<u32> = Vec::with_capacity(ops.len());
    let mut model: BTreeMap<u32, usize> = BTreeMap::new();
    let mut map: AvlTreeMap<u32, usize> = AvlTreeMap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        match op {
            Op::Insert(pick) => {
                let key = pick.resolve(&keys);
                // Duplicate inserts must leave the stored value alone, so
                // the BTreeMap side gets a contains gate instead of its
                // overwriting insert.
                let model_inserted = if model.contains_key(&key) {
                    false
                } else {
                    model.insert(key, op_id);
                    true
                };
                let inserted = map.insert(key, op_id);
                assert_eq!(model_inserted, inserted, "op #{op_id}: {op:?}");
                if inserted {
                    let index = keys.binary_search(&key).unwrap_err();
                    keys.insert(index, key);
                }
            }

            Op::Get(pick) => {
                let key = pick.resolve(&keys);
                assert_eq!(model.get(&key), map.get(&key), "op #{op_id}: {op:?}");
            }

            Op::Remove(pick) => {
                let key = pick.resolve(&keys);
                let model_removed = model.remove(&key).is_some();
                let removed = map.remove(&key);
                assert_eq!(model_removed, removed, "op #{op_id}: {op:?}");
                if removed {
                    let index = keys.binary_search(&key).unwrap();
                    keys.remove(index);
                }
            }
        }

        map.check_consistency();
        assert!(map.is_balanced());
        assert_eq!(model.len(), map.len());
        assert!(model
            .iter()
            .zip(map.iter())
            .all(|((model_key, model_value), (key, value))| model_key == key
                && model_value == value));
    }
}
