//! # redact-crypto — Cryptographic Primitives
//!
//! The authenticated data model the redaction proofs are built over:
//!
//! - **Field hash** ([`hash_fields`], [`hash_text`]): the one hash used by
//!   every structure and accumulator.
//! - **[`MerkleMap`]**: sparse authenticated map keyed by field elements,
//!   whose witnesses recompute both the root and the key.
//! - **[`MerkleTree`]**: fixed-height authenticated array whose witnesses
//!   recompute the root and the leaf index.
//! - **[`MetadataMap`] / [`MetadataTree`]**: parallel `(data, kind)`
//!   structures with paired [`MetadataWitness`]es.
//! - **Oracle signatures** over field sequences (Ed25519).
//!
//! ## Crate Policy
//!
//! - Depends only on `redact-core` internally.
//! - No mocking of cryptographic operations in tests.
//! - No `unsafe` code.

pub mod hash;
pub mod map;
pub mod merkle;
pub mod metadata;
pub mod oracle;
pub mod tree;

pub use hash::{hash_fields, hash_node, hash_text};
pub use map::{MerkleMap, MAP_DEPTH};
pub use merkle::{empty_root, MerkleWitness, PathStep};
pub use metadata::{MetadataMap, MetadataTree, MetadataWitness};
pub use oracle::{OracleKeyPair, OraclePublicKey, OracleSignature};
pub use tree::{MerkleTree, TreeHeight, MAX_TREE_HEIGHT, MIN_TREE_HEIGHT};
