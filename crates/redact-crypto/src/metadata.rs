//! # Metadata Map and Tree
//!
//! An attribute is a `(data, kind)` pair, so records are committed by two
//! parallel authenticated structures sharing one key space: one holding the
//! value commitments, one holding the kind tags. The pair of roots is itself
//! a [`Metadata`], and a membership proof is a pair of witnesses extracted
//! under the same key.

use serde::{Deserialize, Serialize};

use redact_core::{CryptoError, FieldElement, Metadata};

use crate::map::MerkleMap;
use crate::merkle::MerkleWitness;
use crate::tree::{MerkleTree, TreeHeight};

/// Paired witnesses for one key of a [`MetadataMap`] or one index of a
/// [`MetadataTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataWitness {
    pub data: MerkleWitness,
    pub kind: MerkleWitness,
}

impl MetadataWitness {
    /// Recompute the root pair and check that both halves agree on the key.
    pub fn compute_root_and_key(
        &self,
        value: &Metadata,
    ) -> Result<(Metadata, FieldElement), CryptoError> {
        let (data_root, data_key) = self.data.compute_root_and_key(value.data)?;
        let (kind_root, kind_key) = self.kind.compute_root_and_key(value.kind)?;
        if data_key != kind_key {
            return Err(CryptoError::MalformedWitness(
                "data and kind witnesses address different keys".into(),
            ));
        }
        Ok((Metadata::new(data_root, kind_root), data_key))
    }
}

/// Two [`MerkleMap`]s, one for values and one for kinds.
#[derive(Debug, Clone, Default)]
pub struct MetadataMap {
    data: MerkleMap,
    kind: MerkleMap,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Metadata {
        Metadata::new(self.data.root(), self.kind.root())
    }

    pub fn get(&self, key: &FieldElement) -> Option<Metadata> {
        if !self.data.contains(key) {
            return None;
        }
        Some(Metadata::new(self.data.get(key), self.kind.get(key)))
    }

    pub fn set(&mut self, key: FieldElement, value: Metadata) {
        self.data.set(key, value.data);
        self.kind.set(key, value.kind);
    }

    pub fn witness(&self, key: &FieldElement) -> MetadataWitness {
        MetadataWitness {
            data: self.data.witness(key),
            kind: self.kind.witness(key),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldElement> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Indexed analogue of [`MetadataMap`] over two [`MerkleTree`]s of the same
/// height.
#[derive(Debug, Clone)]
pub struct MetadataTree {
    data: MerkleTree,
    kind: MerkleTree,
}

impl MetadataTree {
    pub fn new(height: TreeHeight) -> Self {
        Self {
            data: MerkleTree::new(height),
            kind: MerkleTree::new(height),
        }
    }

    pub fn height(&self) -> TreeHeight {
        self.data.height()
    }

    pub fn root(&self) -> Metadata {
        Metadata::new(self.data.root(), self.kind.root())
    }

    pub fn get(&self, index: u64) -> Result<Metadata, CryptoError> {
        Ok(Metadata::new(
            self.data.get_leaf(index)?,
            self.kind.get_leaf(index)?,
        ))
    }

    pub fn set(&mut self, index: u64, value: Metadata) -> Result<(), CryptoError> {
        self.data.set_leaf(index, value.data)?;
        self.kind.set_leaf(index, value.kind)
    }

    pub fn witness(&self, index: u64) -> Result<MetadataWitness, CryptoError> {
        Ok(MetadataWitness {
            data: self.data.witness(index)?,
            kind: self.kind.witness(index)?,
        })
    }
}
