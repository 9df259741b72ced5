//! # MerkleTree
//!
//! Fixed-height authenticated array. A tree of height `h` has `2^(h-1)`
//! leaves addressed by `u64` index, and its witnesses have `h - 1` steps.
//! Heights run from 2 to 64.

use serde::{Deserialize, Serialize};

use redact_core::{CryptoError, FieldElement, RedactError};

use crate::merkle::{MerkleWitness, SparseMerkle};

/// Smallest supported tree height.
pub const MIN_TREE_HEIGHT: u32 = 2;
/// Largest supported tree height.
pub const MAX_TREE_HEIGHT: u32 = 64;

/// Validated tree height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TreeHeight(u32);

impl TreeHeight {
    pub fn new(height: u32) -> Result<Self, RedactError> {
        if !(MIN_TREE_HEIGHT..=MAX_TREE_HEIGHT).contains(&height) {
            return Err(RedactError::Validation(format!(
                "tree height must be in {MIN_TREE_HEIGHT}..={MAX_TREE_HEIGHT}, got {height}"
            )));
        }
        Ok(Self(height))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Number of steps in a witness for this height.
    pub fn witness_len(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Number of addressable leaves.
    pub fn leaf_count(&self) -> u64 {
        1u64 << (self.0 - 1)
    }
}

impl TryFrom<u32> for TreeHeight {
    type Error = RedactError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TreeHeight> for u32 {
    fn from(h: TreeHeight) -> Self {
        h.0
    }
}

impl std::fmt::Display for TreeHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sparse fixed-height Merkle tree.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    height: TreeHeight,
    tree: SparseMerkle,
}

impl MerkleTree {
    pub fn new(height: TreeHeight) -> Self {
        Self {
            height,
            tree: SparseMerkle::new(height.witness_len()),
        }
    }

    pub fn height(&self) -> TreeHeight {
        self.height
    }

    pub fn root(&self) -> FieldElement {
        self.tree.root()
    }

    fn check_index(&self, index: u64) -> Result<(), CryptoError> {
        if index >= self.height.leaf_count() {
            return Err(CryptoError::MalformedWitness(format!(
                "leaf index {index} out of range for height {}",
                self.height
            )));
        }
        Ok(())
    }

    /// Leaf at `index`, zero when unset.
    pub fn get_leaf(&self, index: u64) -> Result<FieldElement, CryptoError> {
        self.check_index(index)?;
        Ok(self.tree.leaf(&[index, 0, 0, 0]))
    }

    pub fn set_leaf(&mut self, index: u64, value: FieldElement) -> Result<(), CryptoError> {
        self.check_index(index)?;
        self.tree.set_leaf([index, 0, 0, 0], value);
        Ok(())
    }

    pub fn witness(&self, index: u64) -> Result<MerkleWitness, CryptoError> {
        self.check_index(index)?;
        let w = self.tree.witness(&[index, 0, 0, 0]);
        debug_assert_eq!(w.len(), self.tree.depth());
        Ok(w)
    }
}
