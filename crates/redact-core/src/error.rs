//! # Error Types — Structured Error Hierarchy
//!
//! Defines the foundational error types shared by every crate in the
//! workspace. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! ## Design
//!
//! - Field decoding errors name the exact reason an encoding was rejected.
//! - Cryptographic errors fail loudly with full context.
//! - Engine-level failures (witness mismatch, root incompatibility,
//!   cross-check failures) live in the crates that detect them, so that each
//!   failed check keeps its own variant.

use thiserror::Error;

/// Top-level error type for foundational operations.
#[derive(Error, Debug)]
pub enum RedactError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A field element could not be decoded.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// A value failed validation at construction time.
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error decoding a field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The encoded integer is not below the field modulus.
    #[error("value is not a canonical field element (>= modulus)")]
    NonCanonical,

    /// A bit decomposition longer than 256 bits was supplied.
    #[error("bit decomposition too long: {0} bits")]
    TooManyBits(usize),

    /// The hex encoding is malformed.
    #[error("invalid field hex: {0}")]
    InvalidHex(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Numeric attributes must be integers or field elements.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest computation failed.
    #[error("digest error: {0}")]
    DigestError(String),

    /// A Merkle witness is structurally invalid (wrong length, path bits
    /// that do not decode to a canonical key).
    #[error("malformed witness: {0}")]
    MalformedWitness(String),
}
