//! # Field Hash
//!
//! The fixed, collision-resistant hash over field elements used by every
//! authenticated structure and by the proof accumulators.
//!
//! ## Algorithm
//!
//! Domain-separated SHA-256 reduced into the field:
//!
//! ```text
//! hash_fields(x_1..x_n) = F( SHA256( "redact/fields/v1" || u64_le(n) || le(x_1) || ... || le(x_n) ) )
//! hash_text(s)          = F( SHA256( "redact/text/v1"   || u64_le(len) || utf8(s) ) )
//! ```
//!
//! where `F` clears the top two bits of the little-endian digest, giving an
//! element below `2^254`. The length prefix keeps inputs of different arity
//! in disjoint domains.

use sha2::{Digest, Sha256};

use redact_core::FieldElement;

const FIELDS_DOMAIN: &[u8] = b"redact/fields/v1";
const TEXT_DOMAIN: &[u8] = b"redact/text/v1";

/// Hash a sequence of field elements to a field element.
pub fn hash_fields(inputs: &[FieldElement]) -> FieldElement {
    let mut hasher = Sha256::new();
    hasher.update(FIELDS_DOMAIN);
    hasher.update((inputs.len() as u64).to_le_bytes());
    for input in inputs {
        hasher.update(input.to_le_bytes());
    }
    FieldElement::from_digest(finish(hasher))
}

/// Commit a UTF-8 string to a field element.
///
/// Attribute names (map keys), text values and kind tags all enter the
/// field through this function.
pub fn hash_text(text: &str) -> FieldElement {
    let mut hasher = Sha256::new();
    hasher.update(TEXT_DOMAIN);
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    FieldElement::from_digest(finish(hasher))
}

/// Parent node of two Merkle children.
pub fn hash_node(left: FieldElement, right: FieldElement) -> FieldElement {
    hash_fields(&[left, right])
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let hash = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_fields_is_deterministic() {
        let a = [FieldElement::from_u64(1), FieldElement::from_u64(2)];
        assert_eq!(hash_fields(&a), hash_fields(&a));
    }

    #[test]
    fn hash_fields_is_order_sensitive() {
        let ab = hash_fields(&[FieldElement::from_u64(1), FieldElement::from_u64(2)]);
        let ba = hash_fields(&[FieldElement::from_u64(2), FieldElement::from_u64(1)]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn arity_is_domain_separated() {
        let one = hash_fields(&[FieldElement::ZERO]);
        let two = hash_fields(&[FieldElement::ZERO, FieldElement::ZERO]);
        assert_ne!(one, two);
        assert_ne!(hash_fields(&[]), one);
    }

    #[test]
    fn text_and_fields_domains_differ() {
        assert_ne!(hash_text(""), hash_fields(&[]));
    }

    #[test]
    fn text_hash_distinguishes_values() {
        assert_ne!(hash_text("string"), hash_text("number"));
        assert_eq!(hash_text("twitter"), hash_text("twitter"));
    }

    #[test]
    fn outputs_are_below_2_254() {
        for i in 0..32u64 {
            let h = hash_fields(&[FieldElement::from_u64(i)]);
            assert!(!h.bit(254));
            assert!(!h.bit(255));
        }
    }
}
