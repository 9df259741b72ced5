//! # Circuits
//!
//! The three statements this crate proves:
//!
//! - [`map`]: per-attribute disclosure from an original [`MetadataMap`]
//!   into a redacted one, and the recursive merge of such proofs.
//! - [`tree`]: the same algebra over fixed-height indexed trees.
//! - [`badge`]: the single-attribute specialization consumed by the badge
//!   issuer.
//!
//! Map and tree accumulators combine hashes by field addition, so merge is
//! associative and commutative and any aggregation shape yields the same
//! final state.
//!
//! [`MetadataMap`]: redact_crypto::MetadataMap

pub mod badge;
pub mod map;
pub mod tree;

use redact_core::{FieldElement, Metadata};
use redact_crypto::hash_fields;

use crate::error::{MismatchKind, RedactionError, RootField};

/// Binding digest of one disclosed `(position, value)` pair.
pub fn element_hash(position: FieldElement, value: &Metadata) -> FieldElement {
    hash_fields(&[position, value.data, value.kind])
}

/// Both states must describe the same original/redacted pair.
pub(crate) fn check_same_roots(
    left_original: &Metadata,
    left_redacted: &Metadata,
    right_original: &Metadata,
    right_redacted: &Metadata,
) -> Result<(), RedactionError> {
    let pairs = [
        (left_original.data, right_original.data, RootField::OriginalData),
        (left_original.kind, right_original.kind, RootField::OriginalKind),
        (left_redacted.data, right_redacted.data, RootField::RedactedData),
        (left_redacted.kind, right_redacted.kind, RootField::RedactedKind),
    ];
    for (left, right, field) in pairs {
        if left != right {
            return Err(RedactionError::RootIncompatible { field });
        }
    }
    Ok(())
}

/// Compare one recomputed value with its claim.
pub(crate) fn expect_eq(
    recomputed: FieldElement,
    claimed: FieldElement,
    root: RootField,
    what: MismatchKind,
) -> Result<(), RedactionError> {
    if recomputed != claimed {
        return Err(RedactionError::WitnessMismatch { root, what });
    }
    Ok(())
}

/// The four `(witness, value half, claimed root half, field)` checks of a
/// create step, in the order they are evaluated.
pub(crate) fn create_checks<'a, W>(
    original_root: &Metadata,
    redacted_root: &Metadata,
    value: &Metadata,
    original: (&'a W, &'a W),
    redacted: (&'a W, &'a W),
) -> [(&'a W, FieldElement, FieldElement, RootField); 4] {
    [
        (original.0, value.data, original_root.data, RootField::OriginalData),
        (original.1, value.kind, original_root.kind, RootField::OriginalKind),
        (redacted.0, value.data, redacted_root.data, RootField::RedactedData),
        (redacted.1, value.kind, redacted_root.kind, RootField::RedactedKind),
    ]
}

pub(crate) fn malformed(e: redact_core::CryptoError) -> RedactionError {
    RedactionError::MalformedWitness(e.to_string())
}
