//! # Map Redaction Proofs
//!
//! Proves that attributes of a redacted [`MetadataMap`] were copied
//! faithfully from an original one, one attribute per leaf proof, and folds
//! leaf proofs into a single constant-size proof.
//!
//! ## Statement
//!
//! ```text
//! (original_root, redacted_root, hash, count)
//! ```
//!
//! `create` checks, in order, that the original data/kind witnesses and the
//! redacted data/kind witnesses each recompute the claimed root AND the
//! claimed key. It outputs `hash = H(key, data, kind)` and `count = 1`.
//!
//! `merge` verifies both input proofs, requires all four roots to agree and
//! outputs `hash = hash_1 + hash_2`, `count = count_1 + count_2`.
//!
//! `merge` cannot see which keys its inputs cover, so `count` is the number
//! of distinct attributes only when the merged leaves are disjoint. Merging
//! a proof with itself yields `count = 2` for one attribute. The
//! [`Aggregator`](crate::Aggregator) rejects repeated keys before proving;
//! callers merging by hand own that check.
//!
//! ## Security Invariant
//!
//! The key check is enforced. Without it a value could be attested under
//! a key other than the one it is stored at.
//!
//! [`MetadataMap`]: redact_crypto::MetadataMap

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use redact_core::{CanonicalBytes, FieldElement, Metadata};
use redact_crypto::MetadataWitness;

use crate::circuits::{check_same_roots, create_checks, element_hash, expect_eq, malformed};
use crate::error::{MismatchKind, RedactionError};
use crate::mock::MockProof;
use crate::policy::{ProofBackend, ProofPolicy};
use crate::registry::{CircuitId, CircuitRegistry, VerificationKey};

/// Unit of disclosure: the value at `key` is the same in both maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapElement {
    /// Root pair of the original map.
    pub original_root: Metadata,
    /// Root pair of the redacted map.
    pub redacted_root: Metadata,
    /// Attribute key, `hash_text(name)`.
    pub key: FieldElement,
    /// Value stored at `key` in both maps.
    pub value: Metadata,
}

/// Public output of a map redaction proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedState {
    /// Root pair of the original map.
    pub original_root: Metadata,
    /// Root pair of the redacted map.
    pub redacted_root: Metadata,
    /// Field sum of `H(key, data, kind)` over the covered attributes.
    pub hash: FieldElement,
    /// Number of leaf proofs folded in. Equals the number of distinct
    /// attributes only if no key was merged twice.
    pub count: FieldElement,
}

impl RedactedState {
    /// Check one element against its witnesses and open a fresh state.
    pub fn create(
        element: &MapElement,
        original_witness: &MetadataWitness,
        redacted_witness: &MetadataWitness,
    ) -> Result<Self, RedactionError> {
        let checks = create_checks(
            &element.original_root,
            &element.redacted_root,
            &element.value,
            (&original_witness.data, &original_witness.kind),
            (&redacted_witness.data, &redacted_witness.kind),
        );
        for (witness, value, claimed_root, field) in checks {
            let (root, key) = witness.compute_root_and_key(value).map_err(malformed)?;
            expect_eq(root, claimed_root, field, MismatchKind::Root)?;
            expect_eq(key, element.key, field, MismatchKind::Key)?;
        }

        Ok(Self {
            original_root: element.original_root,
            redacted_root: element.redacted_root,
            hash: element_hash(element.key, &element.value),
            count: FieldElement::ONE,
        })
    }

    /// Combine two states about the same record pair.
    pub fn merge(&self, other: &Self) -> Result<Self, RedactionError> {
        check_same_roots(
            &self.original_root,
            &self.redacted_root,
            &other.original_root,
            &other.redacted_root,
        )?;
        Ok(Self {
            original_root: self.original_root,
            redacted_root: self.redacted_root,
            hash: self.hash + other.hash,
            count: self.count + other.count,
        })
    }

    pub fn to_fields(&self) -> [FieldElement; 6] {
        [
            self.original_root.data,
            self.original_root.kind,
            self.redacted_root.data,
            self.redacted_root.kind,
            self.hash,
            self.count,
        ]
    }

    fn statement(&self) -> CanonicalBytes {
        CanonicalBytes::from_fields(&self.to_fields())
    }
}

/// A map redaction proof, transportable as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionProof {
    pub public_output: RedactedState,
    /// Backend the proof was produced under.
    pub backend: ProofBackend,
    pub proof: MockProof,
}

impl RedactionProof {
    pub fn to_json(&self) -> Result<String, RedactionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RedactionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Verify with a distributed key, without a registry.
    pub fn verify_with_key(
        &self,
        key: &VerificationKey,
        policy: &ProofPolicy,
    ) -> Result<(), RedactionError> {
        key.check(
            policy,
            &CircuitId::RedactedMap,
            self.backend,
            &self.proof,
            &self.public_output.statement(),
        )
    }
}

/// Map redaction engine.
#[derive(Debug, Clone)]
pub struct RedactedMap {
    registry: Arc<CircuitRegistry>,
}

impl RedactedMap {
    pub fn new(registry: Arc<CircuitRegistry>) -> Self {
        Self { registry }
    }

    pub fn verification_key(&self) -> Result<&VerificationKey, RedactionError> {
        self.registry.verification_key(&CircuitId::RedactedMap)
    }

    /// Leaf proof for one disclosed attribute.
    pub fn create(
        &self,
        element: &MapElement,
        original_witness: &MetadataWitness,
        redacted_witness: &MetadataWitness,
    ) -> Result<RedactionProof, RedactionError> {
        let state = RedactedState::create(element, original_witness, redacted_witness)?;
        debug!(key = %element.key, "map leaf proved");
        self.prove(state)
    }

    /// Fold two verified proofs into one.
    pub fn merge(
        &self,
        left: &RedactionProof,
        right: &RedactionProof,
    ) -> Result<RedactionProof, RedactionError> {
        self.verify(left)?;
        self.verify(right)?;
        let state = left.public_output.merge(&right.public_output)?;
        debug!(count = %state.count, "map proofs merged");
        self.prove(state)
    }

    pub fn verify(&self, proof: &RedactionProof) -> Result<(), RedactionError> {
        self.registry.verify(
            &CircuitId::RedactedMap,
            proof.backend,
            &proof.proof,
            &proof.public_output.statement(),
        )
    }

    fn prove(&self, state: RedactedState) -> Result<RedactionProof, RedactionError> {
        let proof = self.registry.prove(&CircuitId::RedactedMap, &state.statement())?;
        Ok(RedactionProof {
            public_output: state,
            backend: self.registry.backend(),
            proof,
        })
    }
}
