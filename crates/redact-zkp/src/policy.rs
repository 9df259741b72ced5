//! # Proof Backend Policy
//!
//! Decides whether a proof produced by a given backend may be accepted as
//! authoritative.
//!
//! The only backend compiled into this crate is the transparent SHA-256
//! mock (see [`crate::mock`]). Anyone can recompute a mock proof from its
//! public statement, so a verifier running in production mode must refuse
//! it. Development mode accepts it for local work and tests.
//!
//! ## Configuration
//!
//! 1. `REDACT_PROOF_POLICY` (`production` / `development`)
//! 2. Release builds default to `Production`
//! 3. Debug builds default to `Development`

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from proof policy enforcement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Mock proof rejected in production mode.
    #[error("mock proof rejected: production mode requires a real proof backend ({backend})")]
    MockProofRejected {
        /// The proof backend that was rejected.
        backend: String,
    },
}

/// The backend that produced a proof. Carried inside every serialized proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofBackend {
    /// Deterministic SHA-256 digest, no soundness beyond recomputation.
    MockSha256,
}

impl ProofBackend {
    /// Whether proofs from this backend are sound against a forger.
    pub fn is_real(self) -> bool {
        match self {
            ProofBackend::MockSha256 => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProofBackend::MockSha256 => "mock-sha256",
        }
    }
}

/// Proof policy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Reject mock proofs unconditionally.
    Production,
    /// Accept mock proofs.
    Development,
}

impl PolicyMode {
    /// Parse `production`/`prod` or `development`/`dev`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Some(PolicyMode::Production),
            "development" | "dev" => Some(PolicyMode::Development),
            _ => None,
        }
    }

    /// Build-profile default: release is production, debug is development.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            PolicyMode::Development
        } else {
            PolicyMode::Production
        }
    }
}

/// Runtime policy checked before any proof verification is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofPolicy {
    mode: PolicyMode,
}

impl ProofPolicy {
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode }
    }

    pub fn production() -> Self {
        Self::new(PolicyMode::Production)
    }

    pub fn development() -> Self {
        Self::new(PolicyMode::Development)
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Validate whether `backend` is acceptable under this policy.
    pub fn validate(&self, backend: ProofBackend) -> Result<(), PolicyError> {
        match self.mode {
            PolicyMode::Production if !backend.is_real() => Err(PolicyError::MockProofRejected {
                backend: backend.name().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for ProofPolicy {
    fn default() -> Self {
        Self::new(PolicyMode::build_default())
    }
}
