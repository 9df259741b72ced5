//! # Sparse Merkle Core and Witnesses
//!
//! A fixed-depth sparse binary Merkle tree over field elements, shared by
//! [`MerkleMap`](crate::map::MerkleMap) (depth 255, indexed by key bits) and
//! [`MerkleTree`](crate::tree::MerkleTree) (depth `height - 1`, indexed by a
//! `u64` leaf index).
//!
//! ## Structure
//!
//! ```text
//! empty(0)     = 0
//! empty(l + 1) = H(empty(l), empty(l))
//! node(l + 1, i) = H(node(l, 2i), node(l, 2i + 1))
//! ```
//!
//! Only non-empty nodes are stored; every other node falls back to the
//! precomputed empty-subtree hash of its level.
//!
//! ## Witnesses
//!
//! A [`MerkleWitness`] is the authentication path from a leaf to the root,
//! ordered leaf-first. Each step records whether the node on the path is the
//! LEFT child and the hash of its sibling. The path directions are the leaf
//! position: a step with `is_left == false` contributes a `1` bit.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use redact_core::{CryptoError, FieldElement, FIELD_BITS};

use crate::hash::hash_node;

/// Position of a node in the sparse tree: 256-bit little-endian limbs.
pub(crate) type NodeIndex = [u64; 4];

/// Empty-subtree hashes for levels `0..=FIELD_BITS`.
fn empty_hashes() -> &'static [FieldElement] {
    static EMPTY: OnceLock<Vec<FieldElement>> = OnceLock::new();
    EMPTY.get_or_init(|| {
        let mut levels = Vec::with_capacity(FIELD_BITS + 1);
        let mut current = FieldElement::ZERO;
        levels.push(current);
        for _ in 0..FIELD_BITS {
            current = hash_node(current, current);
            levels.push(current);
        }
        levels
    })
}

/// Root of a subtree of the given depth with every leaf empty.
pub fn empty_root(depth: usize) -> FieldElement {
    empty_hashes()[depth.min(FIELD_BITS)]
}

fn sibling_of(index: &NodeIndex) -> NodeIndex {
    let mut sibling = *index;
    sibling[0] ^= 1;
    sibling
}

fn parent_of(index: &NodeIndex) -> NodeIndex {
    let mut parent = [0u64; 4];
    for i in 0..4 {
        let carry = if i + 1 < 4 { index[i + 1] << 63 } else { 0 };
        parent[i] = (index[i] >> 1) | carry;
    }
    parent
}

/// Sparse storage for a fixed-depth tree.
#[derive(Debug, Clone)]
pub(crate) struct SparseMerkle {
    depth: usize,
    nodes: HashMap<(usize, NodeIndex), FieldElement>,
}

impl SparseMerkle {
    /// An empty tree of `depth` levels above the leaves. `depth` is at most
    /// [`FIELD_BITS`].
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            depth: depth.min(FIELD_BITS),
            nodes: HashMap::new(),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    fn node(&self, level: usize, index: &NodeIndex) -> FieldElement {
        self.nodes
            .get(&(level, *index))
            .copied()
            .unwrap_or_else(|| empty_hashes()[level])
    }

    pub(crate) fn root(&self) -> FieldElement {
        self.node(self.depth, &[0; 4])
    }

    pub(crate) fn leaf(&self, index: &NodeIndex) -> FieldElement {
        self.node(0, index)
    }

    /// Write a leaf and rehash the path to the root.
    pub(crate) fn set_leaf(&mut self, index: NodeIndex, value: FieldElement) {
        let mut idx = index;
        let mut current = value;
        self.nodes.insert((0, idx), current);
        for level in 0..self.depth {
            let sibling = self.node(level, &sibling_of(&idx));
            current = if idx[0] & 1 == 0 {
                hash_node(current, sibling)
            } else {
                hash_node(sibling, current)
            };
            idx = parent_of(&idx);
            self.nodes.insert((level + 1, idx), current);
        }
    }

    /// Authentication path for the leaf at `index`.
    pub(crate) fn witness(&self, index: &NodeIndex) -> MerkleWitness {
        let mut idx = *index;
        let mut path = Vec::with_capacity(self.depth);
        for level in 0..self.depth {
            path.push(PathStep {
                is_left: idx[0] & 1 == 0,
                sibling: self.node(level, &sibling_of(&idx)),
            });
            idx = parent_of(&idx);
        }
        MerkleWitness { path }
    }
}

/// One step of an authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Whether the node on the path is the left child at this level.
    pub is_left: bool,
    /// Hash of the sibling node.
    pub sibling: FieldElement,
}

/// Merkle authentication path, leaf-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleWitness {
    pub path: Vec<PathStep>,
}

impl MerkleWitness {
    /// Number of steps between leaf and root.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Recompute the root implied by placing `leaf` at the witnessed
    /// position.
    pub fn compute_root(&self, leaf: FieldElement) -> FieldElement {
        self.path.iter().fold(leaf, |current, step| {
            if step.is_left {
                hash_node(current, step.sibling)
            } else {
                hash_node(step.sibling, current)
            }
        })
    }

    /// Leaf position bits, least significant first.
    pub fn position_bits(&self) -> Vec<bool> {
        self.path.iter().map(|step| !step.is_left).collect()
    }

    /// Recompute the root and the map key implied by the path directions.
    ///
    /// Only map witnesses (exactly [`FIELD_BITS`] steps) carry a key. A
    /// path whose bits encode a value outside the field is rejected.
    pub fn compute_root_and_key(
        &self,
        value: FieldElement,
    ) -> Result<(FieldElement, FieldElement), CryptoError> {
        if self.path.len() != FIELD_BITS {
            return Err(CryptoError::MalformedWitness(format!(
                "map witness must have {FIELD_BITS} steps, got {}",
                self.path.len()
            )));
        }
        let key = FieldElement::from_bits_le(&self.position_bits())
            .map_err(|e| CryptoError::MalformedWitness(format!("path key: {e}")))?;
        Ok((self.compute_root(value), key))
    }

    /// Leaf index implied by the path directions.
    ///
    /// Only tree witnesses (at most 63 steps) carry an index.
    pub fn calculate_index(&self) -> Result<u64, CryptoError> {
        if self.path.len() > 63 {
            return Err(CryptoError::MalformedWitness(format!(
                "tree witness has {} steps, at most 63 allowed",
                self.path.len()
            )));
        }
        Ok(self
            .path
            .iter()
            .enumerate()
            .filter(|(_, step)| !step.is_left)
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i)))
    }
}
