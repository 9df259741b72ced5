//! # Redaction Errors
//!
//! Every rejected `create` or `merge` names the exact equality that failed,
//! so a malformed disclosure request can be diagnosed from the error alone.
//! None of these errors are transient. Inputs are deterministic and a retry
//! with the same inputs fails the same way.

use redact_core::FieldElement;
use redact_crypto::TreeHeight;
use thiserror::Error;

use crate::policy::PolicyError;
use crate::traits::{ProofError, VerifyError};

/// One of the four roots carried by a redaction statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootField {
    OriginalData,
    OriginalKind,
    RedactedData,
    RedactedKind,
}

impl std::fmt::Display for RootField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RootField::OriginalData => "original.data",
            RootField::OriginalKind => "original.kind",
            RootField::RedactedData => "redacted.data",
            RootField::RedactedKind => "redacted.kind",
        })
    }
}

/// What a witness recomputed differently from the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MismatchKind {
    Root,
    Key,
    Index,
}

impl std::fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MismatchKind::Root => "root",
            MismatchKind::Key => "key",
            MismatchKind::Index => "index",
        })
    }
}

/// Errors from the redaction engines, the badge specializer and aggregation.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// A witness recomputed a root, key or index other than the claimed one.
    #[error("witness mismatch: {root} witness recomputes a different {what}")]
    WitnessMismatch { root: RootField, what: MismatchKind },

    /// Two states being merged describe different record pairs.
    #[error("cannot merge proofs about different records: {field} roots differ")]
    RootIncompatible { field: RootField },

    /// A tree proof or witness belongs to a different tree height.
    #[error("tree height mismatch: engine is height {expected}, input is height {found}")]
    HeightMismatch {
        expected: TreeHeight,
        found: TreeHeight,
    },

    /// The succinct-proof verification rejected the proof.
    #[error("proof invalid for circuit {circuit}: {reason}")]
    ProofInvalid { circuit: String, reason: String },

    /// A witness is structurally unusable (wrong length, split keys).
    #[error("malformed witness: {0}")]
    MalformedWitness(String),

    /// No compiled circuit for the requested id.
    #[error("circuit not compiled: {0}")]
    UnknownCircuit(String),

    /// Aggregation was cancelled between steps.
    #[error("proof aggregation cancelled")]
    Cancelled,

    /// Aggregation was asked to reduce zero leaves.
    #[error("nothing to aggregate")]
    EmptyAggregation,

    /// Two leaves of one aggregate disclose the same key or index.
    #[error("leaf position {position:?} appears more than once in the aggregate")]
    DuplicateLeaf { position: FieldElement },

    /// The reduction shape nests more merges than the aggregator evaluates.
    #[error("reduction depth {depth} exceeds the maximum of {max}")]
    ReductionTooDeep { depth: usize, max: usize },

    /// The worker pool could not be built.
    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("proof generation failed: {0}")]
    Proof(#[from] ProofError),

    #[error("proof verification error: {0}")]
    Verify(#[from] VerifyError),

    /// JSON transport failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RedactionError {
    fn from(e: serde_json::Error) -> Self {
        RedactionError::Serialization(e.to_string())
    }
}
