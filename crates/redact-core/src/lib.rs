#![deny(missing_docs)]
//! # redact-core — Foundational Types for the Redaction Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other crate builds on: the prime field, the `(data, kind)`
//! metadata pair, canonical serialization and digests, identifier newtypes
//! and the shared error hierarchy.
//!
//! ## Key Design Principles
//!
//! 1. **One field type.** Values, kinds, keys, roots, accumulator hashes and
//!    counts are all [`FieldElement`]s. There is no constructor for a
//!    non-canonical element.
//!
//! 2. **`Metadata` everywhere.** Attributes and roots are `(data, kind)`
//!    pairs; the same type is used by the authenticated maps, the proof
//!    engines and the badge issuer.
//!
//! 3. **`CanonicalBytes` newtype.** Proof statements and oracle messages are
//!    hashed and signed only through `CanonicalBytes`, so prover and
//!    verifier always agree on the bytes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `redact-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod field;
pub mod identity;
pub mod metadata;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, Sha256Accumulator};
pub use error::{CanonicalizationError, CryptoError, FieldError, RedactError};
pub use field::{FieldElement, FIELD_BITS};
pub use identity::{AccountAddress, TransactionId};
pub use metadata::Metadata;
pub use temporal::Timestamp;
