//! # Disclosure Builder
//!
//! Turns "show these attributes of my record" into prover inputs. For each
//! selected attribute the builder emits a [`MapElement`] (or
//! [`TreeElement`]) with the paired witnesses into the original and the
//! redacted structures.
//!
//! The plaintext record stays with the discloser. Items carry only field
//! commitments and witnesses, and can be handed to a prover as they are.

use std::collections::BTreeSet;

use thiserror::Error;

use redact_core::Metadata;
use redact_crypto::{MetadataMap, MetadataTree, MetadataWitness, TreeHeight};

use crate::circuits::badge::BadgeDataWitness;
use crate::circuits::map::MapElement;
use crate::circuits::tree::TreeElement;
use crate::record::Record;

/// Errors building a disclosure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisclosureError {
    #[error("attribute {0:?} is not in the original record")]
    UnknownAttribute(String),

    #[error("attribute {0:?} selected more than once")]
    DuplicateAttribute(String),

    #[error("no attributes selected for disclosure")]
    Empty,

    #[error("index {index} out of range for tree height {height}")]
    IndexOutOfRange { index: u64, height: TreeHeight },

    #[error("index {0} selected more than once")]
    DuplicateIndex(u64),

    #[error("{count} values do not fit a tree of height {height}")]
    TooManyValues { count: usize, height: TreeHeight },
}

/// Prover input for one disclosed map attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureItem {
    pub element: MapElement,
    pub original_witness: MetadataWitness,
    pub redacted_witness: MetadataWitness,
}

/// A redacted copy of a record plus the prover inputs that justify it.
#[derive(Debug, Clone)]
pub struct Disclosure {
    redacted: Record,
    redacted_map: MetadataMap,
    original_root: Metadata,
    names: Vec<String>,
    items: Vec<DisclosureItem>,
}

impl Disclosure {
    /// Select `names` from `original`, in the given order.
    pub fn build<S: AsRef<str>>(original: &Record, names: &[S]) -> Result<Self, DisclosureError> {
        if names.is_empty() {
            return Err(DisclosureError::Empty);
        }

        let mut seen = BTreeSet::new();
        let mut redacted = Record::new();
        for name in names {
            let name = name.as_ref();
            if !seen.insert(name) {
                return Err(DisclosureError::DuplicateAttribute(name.to_string()));
            }
            let value = original
                .get(name)
                .ok_or_else(|| DisclosureError::UnknownAttribute(name.to_string()))?;
            redacted.insert(name, value.clone());
        }

        let original_map = original.to_map();
        let redacted_map = redacted.to_map();
        let original_root = original_map.root();
        let redacted_root = redacted_map.root();

        let items = redacted
            .iter()
            .map(|attr| {
                let key = Record::key_for(&attr.name);
                DisclosureItem {
                    element: MapElement {
                        original_root,
                        redacted_root,
                        key,
                        value: attr.value.metadata(),
                    },
                    original_witness: original_map.witness(&key),
                    redacted_witness: redacted_map.witness(&key),
                }
            })
            .collect();

        Ok(Self {
            names: redacted.names().map(str::to_string).collect(),
            redacted,
            redacted_map,
            original_root,
            items,
        })
    }

    pub fn redacted(&self) -> &Record {
        &self.redacted
    }

    pub fn redacted_map(&self) -> &MetadataMap {
        &self.redacted_map
    }

    pub fn original_root(&self) -> Metadata {
        self.original_root
    }

    pub fn redacted_root(&self) -> Metadata {
        self.redacted_map.root()
    }

    pub fn items(&self) -> &[DisclosureItem] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&DisclosureItem> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.items[i])
    }

    pub fn into_items(self) -> Vec<DisclosureItem> {
        self.items
    }

    /// Badge witness for a disclosed attribute, taken from the redacted map.
    pub fn badge_witness(&self, name: &str) -> Option<BadgeDataWitness> {
        let item = self.item(name)?;
        Some(BadgeDataWitness::new(
            item.element.value,
            item.redacted_witness.clone(),
        ))
    }
}

/// Prover input for one disclosed tree leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDisclosureItem {
    pub element: TreeElement,
    pub original_witness: MetadataWitness,
    pub redacted_witness: MetadataWitness,
}

/// Redacted copy of an indexed list plus prover inputs.
#[derive(Debug, Clone)]
pub struct TreeDisclosure {
    original: MetadataTree,
    redacted: MetadataTree,
    items: Vec<TreeDisclosureItem>,
}

impl TreeDisclosure {
    /// Place `values` at indices `0..n` of a tree of `height` and disclose
    /// the leaves at `indices`.
    pub fn build(
        height: TreeHeight,
        values: &[Metadata],
        indices: &[u64],
    ) -> Result<Self, DisclosureError> {
        if indices.is_empty() {
            return Err(DisclosureError::Empty);
        }
        if values.len() as u64 > height.leaf_count() {
            return Err(DisclosureError::TooManyValues {
                count: values.len(),
                height,
            });
        }

        let out_of_range = |index: u64| DisclosureError::IndexOutOfRange { index, height };

        let mut original = MetadataTree::new(height);
        for (i, value) in values.iter().enumerate() {
            original.set(i as u64, *value).map_err(|_| out_of_range(i as u64))?;
        }

        let mut seen = BTreeSet::new();
        let mut redacted = MetadataTree::new(height);
        for &index in indices {
            if !seen.insert(index) {
                return Err(DisclosureError::DuplicateIndex(index));
            }
            let value = usize::try_from(index)
                .ok()
                .and_then(|i| values.get(i))
                .ok_or_else(|| out_of_range(index))?;
            redacted.set(index, *value).map_err(|_| out_of_range(index))?;
        }

        let original_root = original.root();
        let redacted_root = redacted.root();
        let mut items = Vec::with_capacity(indices.len());
        for &index in indices {
            items.push(TreeDisclosureItem {
                element: TreeElement {
                    original_root,
                    redacted_root,
                    index,
                    value: original.get(index).map_err(|_| out_of_range(index))?,
                },
                original_witness: original.witness(index).map_err(|_| out_of_range(index))?,
                redacted_witness: redacted.witness(index).map_err(|_| out_of_range(index))?,
            });
        }

        Ok(Self {
            original,
            redacted,
            items,
        })
    }

    pub fn height(&self) -> TreeHeight {
        self.original.height()
    }

    pub fn original_root(&self) -> Metadata {
        self.original.root()
    }

    pub fn redacted_root(&self) -> Metadata {
        self.redacted.root()
    }

    pub fn items(&self) -> &[TreeDisclosureItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<TreeDisclosureItem> {
        self.items
    }
}
