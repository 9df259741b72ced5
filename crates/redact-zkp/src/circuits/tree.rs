//! # Tree Redaction Proofs
//!
//! The map algebra over fixed-height indexed trees. A [`RedactedTree`]
//! engine is bound to one [`TreeHeight`] when it is built, and rejects
//! witnesses and proofs of any other height. Each height has its own
//! compiled circuit, so proofs never cross heights.
//!
//! `create` checks that each of the four witnesses recomputes its claimed
//! root and the claimed leaf index. `merge` combines hashes by field
//! addition, the same rule as the map variant, and shares its limit:
//! `count` assumes the merged leaves cover disjoint indices.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use redact_core::{CanonicalBytes, FieldElement, Metadata};
use redact_crypto::{MerkleWitness, MetadataWitness, TreeHeight};

use crate::circuits::{check_same_roots, create_checks, element_hash, expect_eq, malformed};
use crate::error::{MismatchKind, RedactionError};
use crate::mock::MockProof;
use crate::policy::{ProofBackend, ProofPolicy};
use crate::registry::{CircuitId, CircuitRegistry, VerificationKey};

/// Unit of disclosure for trees: the value at `index` is the same in both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeElement {
    pub original_root: Metadata,
    pub redacted_root: Metadata,
    /// Leaf index, below `2^(height - 1)`.
    pub index: u64,
    pub value: Metadata,
}

/// Public output of a tree redaction proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedTreeState {
    pub original_root: Metadata,
    pub redacted_root: Metadata,
    /// Field sum of `H(index, data, kind)` over the covered leaves.
    pub hash: FieldElement,
    /// Leaf proofs folded in; distinct leaves only if no index repeats.
    pub count: FieldElement,
}

fn check_height(height: TreeHeight, witness: &MerkleWitness) -> Result<(), RedactionError> {
    if witness.len() == height.witness_len() {
        return Ok(());
    }
    let found = u32::try_from(witness.len() + 1)
        .ok()
        .and_then(|h| TreeHeight::new(h).ok());
    match found {
        Some(found) => Err(RedactionError::HeightMismatch {
            expected: height,
            found,
        }),
        None => Err(RedactionError::MalformedWitness(format!(
            "tree witness of {} steps matches no supported height",
            witness.len()
        ))),
    }
}

impl RedactedTreeState {
    pub fn create(
        height: TreeHeight,
        element: &TreeElement,
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
            check_height(height, witness)?;
            expect_eq(witness.compute_root(value), claimed_root, field, MismatchKind::Root)?;
            let index = witness.calculate_index().map_err(malformed)?;
            if index != element.index {
                return Err(RedactionError::WitnessMismatch {
                    root: field,
                    what: MismatchKind::Index,
                });
            }
        }

        Ok(Self {
            original_root: element.original_root,
            redacted_root: element.redacted_root,
            hash: element_hash(FieldElement::from_u64(element.index), &element.value),
            count: FieldElement::ONE,
        })
    }

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

/// A tree redaction proof. Carries its height so a verifier can pick the
/// matching key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRedactionProof {
    pub height: TreeHeight,
    pub public_output: RedactedTreeState,
    pub backend: ProofBackend,
    pub proof: MockProof,
}

impl TreeRedactionProof {
    pub fn to_json(&self) -> Result<String, RedactionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RedactionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn verify_with_key(
        &self,
        key: &VerificationKey,
        policy: &ProofPolicy,
    ) -> Result<(), RedactionError> {
        key.check(
            policy,
            &CircuitId::RedactedTree(self.height),
            self.backend,
            &self.proof,
            &self.public_output.statement(),
        )
    }
}

/// Tree redaction engine for one height.
#[derive(Debug, Clone)]
pub struct RedactedTree {
    height: TreeHeight,
    circuit: CircuitId,
    registry: Arc<CircuitRegistry>,
}

impl RedactedTree {
    /// Bind an engine to `height`. Fails if that height was not compiled.
    pub fn new(registry: Arc<CircuitRegistry>, height: TreeHeight) -> Result<Self, RedactionError> {
        let circuit = CircuitId::RedactedTree(height);
        registry.verification_key(&circuit)?;
        Ok(Self {
            height,
            circuit,
            registry,
        })
    }

    pub fn height(&self) -> TreeHeight {
        self.height
    }

    pub fn verification_key(&self) -> Result<&VerificationKey, RedactionError> {
        self.registry.verification_key(&self.circuit)
    }

    pub fn create(
        &self,
        element: &TreeElement,
        original_witness: &MetadataWitness,
        redacted_witness: &MetadataWitness,
    ) -> Result<TreeRedactionProof, RedactionError> {
        let state =
            RedactedTreeState::create(self.height, element, original_witness, redacted_witness)?;
        debug!(height = %self.height, index = element.index, "tree leaf proved");
        self.prove(state)
    }

    pub fn merge(
        &self,
        left: &TreeRedactionProof,
        right: &TreeRedactionProof,
    ) -> Result<TreeRedactionProof, RedactionError> {
        self.verify(left)?;
        self.verify(right)?;
        let state = left.public_output.merge(&right.public_output)?;
        debug!(height = %self.height, count = %state.count, "tree proofs merged");
        self.prove(state)
    }

    pub fn verify(&self, proof: &TreeRedactionProof) -> Result<(), RedactionError> {
        if proof.height != self.height {
            return Err(RedactionError::HeightMismatch {
                expected: self.height,
                found: proof.height,
            });
        }
        self.registry.verify(
            &self.circuit,
            proof.backend,
            &proof.proof,
            &proof.public_output.statement(),
        )
    }

    fn prove(&self, state: RedactedTreeState) -> Result<TreeRedactionProof, RedactionError> {
        let proof = self.registry.prove(&self.circuit, &state.statement())?;
        Ok(TreeRedactionProof {
            height: self.height,
            public_output: state,
            backend: self.registry.backend(),
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProverConfig;
    use crate::error::RootField;
    use redact_crypto::{hash_text, MetadataTree};

    fn h(n: u32) -> TreeHeight {
        TreeHeight::new(n).unwrap()
    }

    fn attr(value: &str) -> Metadata {
        Metadata::new(hash_text(value), hash_text("string"))
    }

    struct Fixture {
        original: MetadataTree,
        redacted: MetadataTree,
    }

    fn fixture(height: u32) -> Fixture {
        let mut original = MetadataTree::new(h(height));
        let mut redacted = MetadataTree::new(h(height));
        for (i, v) in ["a", "b", "c", "d"].iter().enumerate() {
            original.set(i as u64, attr(v)).unwrap();
        }
        redacted.set(1, attr("b")).unwrap();
        redacted.set(3, attr("d")).unwrap();
        Fixture { original, redacted }
    }

    fn element(f: &Fixture, index: u64) -> TreeElement {
        TreeElement {
            original_root: f.original.root(),
            redacted_root: f.redacted.root(),
            index,
            value: f.original.get(index).unwrap(),
        }
    }

    fn create(f: &Fixture, height: u32, el: &TreeElement, witness_index: u64) -> Result<RedactedTreeState, RedactionError> {
        RedactedTreeState::create(
            h(height),
            el,
            &f.original.witness(witness_index).unwrap(),
            &f.redacted.witness(witness_index).unwrap(),
        )
    }

    #[test]
    fn create_checks_roots_and_index() {
        let f = fixture(4);
        let el = element(&f, 1);
        let state = create(&f, 4, &el, 1).unwrap();
        assert_eq!(state.count, FieldElement::ONE);
        assert_eq!(state.hash, element_hash(FieldElement::from_u64(1), &attr("b")));
    }

    #[test]
    fn create_rejects_wrong_index() {
        let f = fixture(4);
        let mut el = element(&f, 3);
        el.value = attr("d");
        el.index = 1;
        // Witness for index 3 recomputes the right roots but a different index.
        let err = create(&f, 4, &el, 3).unwrap_err();
        assert!(matches!(
            err,
            RedactionError::WitnessMismatch {
                root: RootField::OriginalData,
                what: MismatchKind::Index
            }
        ));
    }

    #[test]
    fn create_rejects_undisclosed_index() {
        let f = fixture(4);
        let el = element(&f, 0);
        let err = create(&f, 4, &el, 0).unwrap_err();
        assert!(matches!(
            err,
            RedactionError::WitnessMismatch {
                root: RootField::RedactedData,
                what: MismatchKind::Root
            }
        ));
    }

    #[test]
    fn create_rejects_witness_of_other_height() {
        let f = fixture(5);
        let el = element(&f, 1);
        let err = create(&f, 4, &el, 1).unwrap_err();
        assert!(matches!(err, RedactionError::HeightMismatch { .. }));
    }

    #[test]
    fn engine_requires_compiled_height() {
        let registry = CircuitRegistry::init(&ProverConfig::development(&[4]).unwrap()).unwrap();
        assert!(RedactedTree::new(registry.clone(), h(4)).is_ok());
        assert!(matches!(
            RedactedTree::new(registry, h(5)),
            Err(RedactionError::UnknownCircuit(_))
        ));
    }

    #[test]
    fn engines_of_different_heights_do_not_interoperate() {
        let registry =
            CircuitRegistry::init(&ProverConfig::development(&[4, 5]).unwrap()).unwrap();
        let four = RedactedTree::new(registry.clone(), h(4)).unwrap();
        let five = RedactedTree::new(registry, h(5)).unwrap();

        let f = fixture(4);
        let el = element(&f, 1);
        let proof = four
            .create(&el, &f.original.witness(1).unwrap(), &f.redacted.witness(1).unwrap())
            .unwrap();
        four.verify(&proof).unwrap();
        assert!(matches!(
            five.verify(&proof),
            Err(RedactionError::HeightMismatch { .. })
        ));

        let mut relabelled = proof.clone();
        relabelled.height = h(5);
        assert!(matches!(
            five.verify(&relabelled),
            Err(RedactionError::ProofInvalid { .. })
        ));
    }

    #[test]
    fn engine_merge_and_json() {
        let registry = CircuitRegistry::init(&ProverConfig::development(&[4]).unwrap()).unwrap();
        let engine = RedactedTree::new(registry, h(4)).unwrap();
        let f = fixture(4);
        let proofs: Vec<_> = [1u64, 3]
            .iter()
            .map(|i| {
                engine
                    .create(
                        &element(&f, *i),
                        &f.original.witness(*i).unwrap(),
                        &f.redacted.witness(*i).unwrap(),
                    )
                    .unwrap()
            })
            .collect();
        let merged = engine.merge(&proofs[0], &proofs[1]).unwrap();
        let reversed = engine.merge(&proofs[1], &proofs[0]).unwrap();
        assert_eq!(merged.public_output, reversed.public_output);
        assert_eq!(merged.public_output.count, FieldElement::from_u64(2));

        let back = TreeRedactionProof::from_json(&merged.to_json().unwrap()).unwrap();
        back.verify_with_key(engine.verification_key().unwrap(), &ProofPolicy::development())
            .unwrap();
    }
}
