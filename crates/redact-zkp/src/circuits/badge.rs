//! # Badge Data Proofs
//!
//! Single-attribute specialization of the map disclosure. Where a map
//! redaction proof only carries the roots it was given, a badge proof
//! recomputes the redacted root pair and the key directly from the witness
//! and the claimed value. The issuer compares this independent attestation
//! with the aggregate redaction proof before granting a badge.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use redact_core::{CanonicalBytes, FieldElement, Metadata};
use redact_crypto::MetadataWitness;

use crate::circuits::malformed;
use crate::error::RedactionError;
use crate::mock::MockProof;
use crate::policy::{ProofBackend, ProofPolicy};
use crate::registry::{CircuitId, CircuitRegistry, VerificationKey};

/// Private input: one value and its paired witness in the redacted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDataWitness {
    pub value: Metadata,
    pub witness: MetadataWitness,
}

impl BadgeDataWitness {
    pub fn new(value: Metadata, witness: MetadataWitness) -> Self {
        Self { value, witness }
    }
}

/// Public output: the recomputed root pair, the key and the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeData {
    /// Root pair of the redacted map the value was read from.
    pub root: Metadata,
    /// Key the witness places the value at.
    pub key: FieldElement,
    pub data: Metadata,
}

impl BadgeData {
    /// Recompute root and key from the witness. Nothing upstream is trusted.
    pub fn create(witness: &BadgeDataWitness) -> Result<Self, RedactionError> {
        let (root, key) = witness
            .witness
            .compute_root_and_key(&witness.value)
            .map_err(malformed)?;
        Ok(Self {
            root,
            key,
            data: witness.value,
        })
    }

    pub fn to_fields(&self) -> [FieldElement; 5] {
        [
            self.root.data,
            self.root.kind,
            self.key,
            self.data.data,
            self.data.kind,
        ]
    }

    fn statement(&self) -> CanonicalBytes {
        CanonicalBytes::from_fields(&self.to_fields())
    }
}

/// A badge data proof, transportable as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeProof {
    pub public_output: BadgeData,
    pub backend: ProofBackend,
    pub proof: MockProof,
}

impl BadgeProof {
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
            &CircuitId::BadgeData,
            self.backend,
            &self.proof,
            &self.public_output.statement(),
        )
    }
}

/// Prover for [`BadgeData`].
#[derive(Debug, Clone)]
pub struct BadgeProver {
    registry: Arc<CircuitRegistry>,
}

impl BadgeProver {
    pub fn new(registry: Arc<CircuitRegistry>) -> Self {
        Self { registry }
    }

    pub fn verification_key(&self) -> Result<&VerificationKey, RedactionError> {
        self.registry.verification_key(&CircuitId::BadgeData)
    }

    pub fn create(&self, witness: &BadgeDataWitness) -> Result<BadgeProof, RedactionError> {
        let data = BadgeData::create(witness)?;
        debug!(key = %data.key, "badge data proved");
        let proof = self.registry.prove(&CircuitId::BadgeData, &data.statement())?;
        Ok(BadgeProof {
            public_output: data,
            backend: self.registry.backend(),
            proof,
        })
    }

    pub fn verify(&self, proof: &BadgeProof) -> Result<(), RedactionError> {
        self.registry.verify(
            &CircuitId::BadgeData,
            proof.backend,
            &proof.proof,
            &proof.public_output.statement(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProverConfig;
    use redact_crypto::{hash_text, MetadataMap};

    fn redacted() -> (MetadataMap, FieldElement, Metadata) {
        let key = hash_text("twitter");
        let value = Metadata::new(hash_text("@x"), hash_text("string"));
        let mut map = MetadataMap::new();
        map.set(key, value);
        (map, key, value)
    }

    #[test]
    fn create_recomputes_root_and_key() {
        let (map, key, value) = redacted();
        let data = BadgeData::create(&BadgeDataWitness::new(value, map.witness(&key))).unwrap();
        assert_eq!(data.root, map.root());
        assert_eq!(data.key, key);
        assert_eq!(data.data, value);
    }

    #[test]
    fn wrong_value_recomputes_other_root() {
        let (map, key, _) = redacted();
        let forged = Metadata::new(hash_text("@y"), hash_text("string"));
        let data = BadgeData::create(&BadgeDataWitness::new(forged, map.witness(&key))).unwrap();
        assert_ne!(data.root, map.root());
    }

    #[test]
    fn prover_roundtrip() {
        let registry = CircuitRegistry::init(&ProverConfig::development(&[4]).unwrap()).unwrap();
        let prover = BadgeProver::new(registry);
        let (map, key, value) = redacted();
        let proof = prover
            .create(&BadgeDataWitness::new(value, map.witness(&key)))
            .unwrap();
        prover.verify(&proof).unwrap();

        let back = BadgeProof::from_json(&proof.to_json().unwrap()).unwrap();
        back.verify_with_key(prover.verification_key().unwrap(), &ProofPolicy::development())
            .unwrap();

        let mut tampered = back;
        tampered.public_output.data.kind = hash_text("number");
        assert!(matches!(
            prover.verify(&tampered),
            Err(RedactionError::ProofInvalid { .. })
        ));
    }
}
