//! # Circuit Registry
//!
//! Compiled proving and verification keys for every circuit the engines
//! prove through. The registry is built once by [`CircuitRegistry::init`],
//! is immutable afterwards, and is shared by `Arc` with every engine that
//! needs it. There is no process-wide cache.
//!
//! ## Circuits
//!
//! | Id | Statement |
//! |---|---|
//! | `redacted-map` | map-variant [`RedactedState`](crate::circuits::map::RedactedState) |
//! | `badge-data` | [`BadgeData`](crate::circuits::badge::BadgeData) |
//! | `redacted-tree/<h>` | tree-variant state for height `h` |
//!
//! Every tree height gets its own key pair, so proofs for different heights
//! never interoperate. Requesting a height that was not configured is an
//! error.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use redact_core::CanonicalBytes;
use redact_crypto::TreeHeight;

use crate::config::ProverConfig;
use crate::error::RedactionError;
use crate::mock::{MockProof, MockProofSystem, MockProvingKey, MockVerifyingKey};
use crate::policy::{ProofBackend, ProofPolicy};
use crate::traits::ProofSystem;

/// Identifier of a compiled circuit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CircuitId {
    RedactedMap,
    BadgeData,
    RedactedTree(TreeHeight),
}

impl std::fmt::Display for CircuitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitId::RedactedMap => f.write_str("redacted-map"),
            CircuitId::BadgeData => f.write_str("badge-data"),
            CircuitId::RedactedTree(h) => write!(f, "redacted-tree/{h}"),
        }
    }
}

impl FromStr for CircuitId {
    type Err = RedactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redacted-map" => Ok(CircuitId::RedactedMap),
            "badge-data" => Ok(CircuitId::BadgeData),
            other => {
                let height = other
                    .strip_prefix("redacted-tree/")
                    .and_then(|h| h.parse::<u32>().ok())
                    .and_then(|h| TreeHeight::new(h).ok())
                    .ok_or_else(|| RedactionError::UnknownCircuit(other.to_string()))?;
                Ok(CircuitId::RedactedTree(height))
            }
        }
    }
}

impl TryFrom<String> for CircuitId {
    type Error = RedactionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CircuitId> for String {
    fn from(id: CircuitId) -> Self {
        id.to_string()
    }
}

/// A distributable verification key: what a remote verifier needs to check
/// proofs for one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    pub backend: ProofBackend,
    pub key: MockVerifyingKey,
}

impl VerificationKey {
    pub fn circuit(&self) -> &CircuitId {
        &self.key.circuit
    }

    pub fn to_json(&self) -> Result<String, RedactionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RedactionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check `proof` over `statement`, which must belong to `expected`.
    ///
    /// Policy is checked first: a production policy rejects the mock
    /// backend before any recomputation.
    pub(crate) fn check(
        &self,
        policy: &ProofPolicy,
        expected: &CircuitId,
        backend: ProofBackend,
        proof: &MockProof,
        statement: &CanonicalBytes,
    ) -> Result<(), RedactionError> {
        policy.validate(backend)?;
        if self.circuit() != expected {
            return Err(RedactionError::ProofInvalid {
                circuit: expected.to_string(),
                reason: format!("verification key is for {}", self.circuit()),
            });
        }
        if backend != self.backend {
            return Err(RedactionError::ProofInvalid {
                circuit: expected.to_string(),
                reason: format!("proof backend {} does not match key", backend.name()),
            });
        }
        if !MockProofSystem.verify(&self.key, proof, statement)? {
            return Err(RedactionError::ProofInvalid {
                circuit: expected.to_string(),
                reason: "proof does not match public output".into(),
            });
        }
        Ok(())
    }
}

struct CompiledCircuit {
    proving_key: MockProvingKey,
    verification_key: VerificationKey,
}

/// Immutable registry of compiled circuits.
pub struct CircuitRegistry {
    system: MockProofSystem,
    policy: ProofPolicy,
    circuits: BTreeMap<CircuitId, CompiledCircuit>,
}

impl std::fmt::Debug for CircuitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitRegistry")
            .field("policy", &self.policy)
            .field("circuits", &self.circuits.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CircuitRegistry {
    /// Compile every configured circuit.
    pub fn init(config: &ProverConfig) -> Result<Arc<Self>, RedactionError> {
        let system = MockProofSystem;
        let mut ids = vec![CircuitId::RedactedMap, CircuitId::BadgeData];
        ids.extend(config.tree_heights.iter().copied().map(CircuitId::RedactedTree));

        let mut circuits = BTreeMap::new();
        for id in ids {
            let (proving_key, key) = system.setup(&id)?;
            circuits.insert(
                id,
                CompiledCircuit {
                    proving_key,
                    verification_key: VerificationKey {
                        backend: system.backend(),
                        key,
                    },
                },
            );
        }

        info!(
            circuits = circuits.len(),
            backend = system.backend().name(),
            policy = ?config.policy,
            "circuit registry initialised"
        );

        Ok(Arc::new(Self {
            system,
            policy: ProofPolicy::new(config.policy),
            circuits,
        }))
    }

    pub fn policy(&self) -> &ProofPolicy {
        &self.policy
    }

    pub fn backend(&self) -> ProofBackend {
        self.system.backend()
    }

    /// Ids of all compiled circuits, in order.
    pub fn circuit_ids(&self) -> impl Iterator<Item = &CircuitId> {
        self.circuits.keys()
    }

    /// Whether a tree circuit of `height` was compiled.
    pub fn supports_height(&self, height: TreeHeight) -> bool {
        self.circuits.contains_key(&CircuitId::RedactedTree(height))
    }

    fn compiled(&self, id: &CircuitId) -> Result<&CompiledCircuit, RedactionError> {
        self.circuits
            .get(id)
            .ok_or_else(|| RedactionError::UnknownCircuit(id.to_string()))
    }

    pub fn verification_key(&self, id: &CircuitId) -> Result<&VerificationKey, RedactionError> {
        Ok(&self.compiled(id)?.verification_key)
    }

    pub(crate) fn prove(
        &self,
        id: &CircuitId,
        statement: &CanonicalBytes,
    ) -> Result<MockProof, RedactionError> {
        let compiled = self.compiled(id)?;
        Ok(self.system.prove(&compiled.proving_key, statement)?)
    }

    pub(crate) fn verify(
        &self,
        id: &CircuitId,
        backend: ProofBackend,
        proof: &MockProof,
        statement: &CanonicalBytes,
    ) -> Result<(), RedactionError> {
        self.verification_key(id)?
            .check(&self.policy, id, backend, proof, statement)
    }
}
