//! # Proof System Trait (Sealed)
//!
//! The black-box succinct-proof primitive every engine proves through.
//! A backend turns a circuit identifier into a key pair once, proves a
//! public statement under the proving key, and verifies a proof against the
//! same statement under the verification key.
//!
//! Statements are always [`CanonicalBytes`], so prover and verifier hash
//! the same bytes regardless of where they run.
//!
//! ## Sealed Trait
//!
//! Only backends defined inside `redact-zkp` can implement
//! [`ProofSystem`]. External crates cannot inject a backend that would
//! bypass [`ProofPolicy`](crate::policy::ProofPolicy).

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use redact_core::CanonicalBytes;

use crate::policy::ProofBackend;
use crate::registry::CircuitId;

/// Error during setup or proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// Key generation for a circuit failed.
    #[error("circuit setup failed: {0}")]
    SetupFailed(String),
    /// Proof generation failed internally.
    #[error("proof generation failed: {0}")]
    GenerationFailed(String),
}

/// Error during proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof is structurally malformed.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

mod private {
    pub trait Sealed {}
}

/// Interface of a succinct proof backend.
pub trait ProofSystem: private::Sealed + Send + Sync {
    /// The proof artifact produced by `prove()`.
    type Proof: Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug;
    /// Verification key, distributed to verifiers.
    type VerifyingKey: Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug;
    /// Proving key, kept by the prover.
    type ProvingKey: Send + Sync;

    /// Which backend this is, for policy checks.
    fn backend(&self) -> ProofBackend;

    /// Compile `circuit` into a key pair.
    fn setup(
        &self,
        circuit: &CircuitId,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), ProofError>;

    /// Prove `statement` under `pk`.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        statement: &CanonicalBytes,
    ) -> Result<Self::Proof, ProofError>;

    /// `Ok(true)` if `proof` is valid for `statement` under `vk`,
    /// `Ok(false)` if it is well-formed but invalid.
    ///
    /// # Errors
    ///
    /// [`VerifyError::MalformedProof`] if the proof cannot be decoded.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        statement: &CanonicalBytes,
    ) -> Result<bool, VerifyError>;
}

impl private::Sealed for crate::mock::MockProofSystem {}
