//! # Mock Proof System
//!
//! A deterministic, transparent backend. Produces SHA-256 "proofs" that
//! are verifiable by recomputation but provide **no zero-knowledge** and no
//! soundness against anyone who knows the statement.
//!
//! ```text
//! key_digest = SHA256( JCS({"backend": "mock-sha256", "circuit": id, "version": 1}) )
//! proof      = SHA256( key_digest || statement )
//! ```
//!
//! Binding the key digest into every proof means a proof for one circuit
//! never verifies under another circuit's key, including tree circuits of
//! different heights.
//!
//! ## Security Warning
//!
//! Production verifiers reject this backend through
//! [`ProofPolicy`](crate::policy::ProofPolicy).

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use redact_core::{sha256_digest, CanonicalBytes, ContentDigest, Sha256Accumulator};

use crate::policy::ProofBackend;
use crate::registry::CircuitId;
use crate::traits::{ProofError, ProofSystem, VerifyError};

const MOCK_KEY_VERSION: u32 = 1;

/// A mock proof: hex SHA-256 of key digest and statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockProof {
    pub proof_hex: String,
}

/// Mock verification key. Public, carries the circuit binding digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockVerifyingKey {
    pub circuit: CircuitId,
    pub key_digest: ContentDigest,
}

/// Mock proving key. Holds the same digest as the verification key.
#[derive(Debug, Clone)]
pub struct MockProvingKey {
    key_digest: ContentDigest,
}

/// The SHA-256 mock backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProofSystem;

impl MockProofSystem {
    fn digest(key_digest: &ContentDigest, statement: &CanonicalBytes) -> String {
        let mut acc = Sha256Accumulator::new();
        acc.update(key_digest.as_bytes());
        acc.update(statement.as_bytes());
        acc.finalize_hex()
    }
}

impl ProofSystem for MockProofSystem {
    type Proof = MockProof;
    type VerifyingKey = MockVerifyingKey;
    type ProvingKey = MockProvingKey;

    fn backend(&self) -> ProofBackend {
        ProofBackend::MockSha256
    }

    fn setup(
        &self,
        circuit: &CircuitId,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), ProofError> {
        let descriptor = serde_json::json!({
            "backend": ProofBackend::MockSha256.name(),
            "circuit": circuit.to_string(),
            "version": MOCK_KEY_VERSION,
        });
        let canonical = CanonicalBytes::new(&descriptor)
            .map_err(|e| ProofError::SetupFailed(format!("{circuit}: {e}")))?;
        let key_digest = sha256_digest(&canonical);
        Ok((
            MockProvingKey {
                key_digest,
            },
            MockVerifyingKey {
                circuit: circuit.clone(),
                key_digest,
            },
        ))
    }

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        statement: &CanonicalBytes,
    ) -> Result<Self::Proof, ProofError> {
        Ok(MockProof {
            proof_hex: Self::digest(&pk.key_digest, statement),
        })
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        statement: &CanonicalBytes,
    ) -> Result<bool, VerifyError> {
        if proof.proof_hex.len() != 64 {
            return Err(VerifyError::MalformedProof(format!(
                "expected 64 hex chars, got {}",
                proof.proof_hex.len()
            )));
        }
        if !proof.proof_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerifyError::MalformedProof(
                "proof_hex contains non-hex characters".to_string(),
            ));
        }
        let expected = Self::digest(&vk.key_digest, statement);
        let found = proof.proof_hex.to_lowercase();
        Ok(bool::from(found.as_bytes().ct_eq(expected.as_bytes())))
    }
}
