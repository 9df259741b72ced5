//! # redact-zkp — Redaction Proof Engine
//!
//! Proves that a redacted record is a faithful copy of part of an original
//! record, without revealing the rest, and folds any number of such
//! per-attribute proofs into one constant-size proof.
//!
//! ## Architecture
//!
//! - **Proof primitive** (`traits.rs`, `mock.rs`): the sealed `ProofSystem`
//!   trait and the transparent SHA-256 `MockProofSystem` backend.
//!
//! - **Registry** (`registry.rs`): `CircuitRegistry` compiles every circuit
//!   once per process and is passed by `Arc` to each engine.
//!
//! - **Policy & config** (`policy.rs`, `config.rs`): whether mock proofs are
//!   accepted, pool size and compiled tree heights.
//!
//! - **Record model & disclosure** (`record.rs`, `disclosure.rs`): attributes
//!   committed as `(data, kind)` pairs, and the builder that turns a
//!   selection of attribute names into prover inputs.
//!
//! - **Circuits** (`circuits/`): map and tree redaction engines, and the
//!   single-attribute badge specializer.
//!
//! - **Aggregation** (`aggregate.rs`): explicit `ProofTree` shapes reduced
//!   in parallel on a bounded `rayon` pool, cancellable between steps.
//!
//! ## Crate Policy
//!
//! - Depends on `redact-core` and `redact-crypto` internally.
//! - Every rejected check has its own error variant.
//! - No `unsafe` code.

pub mod aggregate;
pub mod circuits;
pub mod config;
pub mod disclosure;
pub mod error;
pub mod mock;
pub mod policy;
pub mod record;
pub mod registry;
pub mod traits;

pub use aggregate::{Aggregate, Aggregator, CancellationFlag, ProofTree, MAX_REDUCTION_DEPTH};
pub use circuits::badge::{BadgeData, BadgeDataWitness, BadgeProof, BadgeProver};
pub use circuits::element_hash;
pub use circuits::map::{MapElement, RedactedMap, RedactedState, RedactionProof};
pub use circuits::tree::{RedactedTree, RedactedTreeState, TreeElement, TreeRedactionProof};
pub use config::{ConfigError, ProverConfig};
pub use disclosure::{Disclosure, DisclosureError, DisclosureItem, TreeDisclosure, TreeDisclosureItem};
pub use error::{MismatchKind, RedactionError, RootField};
pub use mock::MockProofSystem;
pub use policy::{PolicyError, PolicyMode, ProofBackend, ProofPolicy};
pub use record::{Attribute, AttributeKind, AttributeValue, Record};
pub use registry::{CircuitId, CircuitRegistry, VerificationKey};
pub use traits::ProofSystem;
