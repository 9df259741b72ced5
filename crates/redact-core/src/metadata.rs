//! # Metadata — (value, kind) Commitment Pairs
//!
//! Every attribute of an item is committed as two field elements: the
//! commitment to its value (`data`) and a tag naming its semantic type
//! (`kind`, e.g. the commitment to `"string"` or `"map"`). The authenticated
//! structures keep one tree per component, so roots are `Metadata` as well.
//!
//! `Metadata` is immutable and compared only by field equality.

use serde::{Deserialize, Serialize};

use crate::field::FieldElement;

/// A value commitment together with its kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Commitment to the attribute value (or the data-tree root).
    pub data: FieldElement,
    /// Commitment to the attribute kind (or the kind-tree root).
    pub kind: FieldElement,
}

impl Metadata {
    /// Pair a value commitment with its kind tag.
    pub const fn new(data: FieldElement, kind: FieldElement) -> Self {
        Self { data, kind }
    }

    /// The empty pair, i.e. the value of an unset map slot.
    pub const fn empty() -> Self {
        Self {
            data: FieldElement::ZERO,
            kind: FieldElement::ZERO,
        }
    }

    /// Whether both components are zero.
    pub fn is_empty(&self) -> bool {
        self.data.is_zero() && self.kind.is_zero()
    }

    /// Field serialization in the fixed order `[data, kind]`.
    pub fn to_fields(&self) -> [FieldElement; 2] {
        [self.data, self.kind]
    }
}

impl std::fmt::Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(data={}, kind={})", self.data, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metadata_is_zero_pair() {
        let m = Metadata::empty();
        assert!(m.is_empty());
        assert_eq!(m, Metadata::default());
    }

    #[test]
    fn equality_is_componentwise() {
        let a = Metadata::new(FieldElement::from_u64(1), FieldElement::from_u64(2));
        let b = Metadata::new(FieldElement::from_u64(1), FieldElement::from_u64(3));
        assert_ne!(a, b);
        assert_eq!(a, Metadata::new(FieldElement::from_u64(1), FieldElement::from_u64(2)));
    }

    #[test]
    fn serde_roundtrip() {
        let m = Metadata::new(FieldElement::from_u64(12), FieldElement::from_u64(99));
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"kind\""));
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
