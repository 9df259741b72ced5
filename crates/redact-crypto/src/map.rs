//! # MerkleMap
//!
//! Authenticated key/value map over field elements. A key selects a leaf of
//! a 255-level sparse tree through its little-endian bits, so any canonical
//! field element is a valid key. Unset keys read as zero, and the root of an
//! empty map is the depth-255 empty-subtree hash.

use std::collections::BTreeMap;

use redact_core::{FieldElement, FIELD_BITS};

use crate::merkle::{MerkleWitness, NodeIndex, SparseMerkle};

/// Number of levels between a map leaf and the map root.
pub const MAP_DEPTH: usize = FIELD_BITS;

fn key_index(key: &FieldElement) -> NodeIndex {
    *key.limbs()
}

/// Sparse authenticated map from field keys to field values.
#[derive(Debug, Clone)]
pub struct MerkleMap {
    tree: SparseMerkle,
    entries: BTreeMap<FieldElement, FieldElement>,
}

impl Default for MerkleMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MerkleMap {
    pub fn new() -> Self {
        Self {
            tree: SparseMerkle::new(MAP_DEPTH),
            entries: BTreeMap::new(),
        }
    }

    /// Current root commitment.
    pub fn root(&self) -> FieldElement {
        self.tree.root()
    }

    /// Value stored at `key`, or zero if the key was never set.
    pub fn get(&self, key: &FieldElement) -> FieldElement {
        self.tree.leaf(&key_index(key))
    }

    /// Whether `key` has been written.
    pub fn contains(&self, key: &FieldElement) -> bool {
        self.entries.contains_key(key)
    }

    /// Write `value` at `key`, updating the root.
    pub fn set(&mut self, key: FieldElement, value: FieldElement) {
        self.tree.set_leaf(key_index(&key), value);
        self.entries.insert(key, value);
    }

    /// Authentication path for `key`. Valid for unset keys too, where it
    /// proves the zero leaf.
    pub fn witness(&self, key: &FieldElement) -> MerkleWitness {
        self.tree.witness(&key_index(key))
    }

    /// Written keys in ascending field order.
    pub fn keys(&self) -> impl Iterator<Item = &FieldElement> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn every_written_key_has_a_valid_witness(
            entries in proptest::collection::btree_map(any::<u64>(), any::<u64>(), 1..6)
        ) {
            let mut map = MerkleMap::new();
            for (k, v) in &entries {
                map.set(FieldElement::from_u64(*k), FieldElement::from_u64(*v));
            }
            for (k, v) in &entries {
                let key = FieldElement::from_u64(*k);
                let (root, derived) = map
                    .witness(&key)
                    .compute_root_and_key(FieldElement::from_u64(*v))
                    .unwrap();
                prop_assert_eq!(root, map.root());
                prop_assert_eq!(derived, key);
            }
        }
    }
}
