//! # Oracle Signatures
//!
//! The oracle attests off-structure facts ("this disclosed value was checked
//! out of band") by signing a sequence of field elements. Signatures are
//! Ed25519 over the canonical field serialization
//! ([`CanonicalBytes::from_fields`]), so signer and verifier agree on the
//! exact message bytes without sharing any other encoding.
//!
//! ## Security Invariant
//!
//! - Only field sequences are signed. There is no API for signing raw bytes.
//! - `OracleKeyPair` does not implement `Serialize` and never exposes the
//!   private seed.
//! - Public keys and signatures serialize as lowercase hex.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use redact_core::{CanonicalBytes, CryptoError, FieldElement};

/// Oracle verification key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OraclePublicKey([u8; 32]);

/// Ed25519 signature over a field sequence (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OracleSignature([u8; 64]);

/// Oracle signing key.
pub struct OracleKeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl OraclePublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = decode_fixed::<32>(hex).map_err(CryptoError::KeyError)?;
        Ok(Self(bytes))
    }

    fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid oracle key: {e}")))
    }

    /// Verify `signature` over `fields`.
    ///
    /// # Errors
    ///
    /// [`CryptoError::KeyError`] if the key is not a valid curve point,
    /// [`CryptoError::VerificationFailed`] if the signature does not match.
    pub fn verify_fields(
        &self,
        fields: &[FieldElement],
        signature: &OracleSignature,
    ) -> Result<(), CryptoError> {
        let vk = self.to_verifying_key()?;
        let message = CanonicalBytes::from_fields(fields);
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        vk.verify(message.as_bytes(), &sig).map_err(|_| {
            CryptoError::VerificationFailed(format!(
                "oracle signature does not match {} field(s)",
                fields.len()
            ))
        })
    }
}

impl OracleSignature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = decode_fixed::<64>(hex).map_err(CryptoError::VerificationFailed)?;
        Ok(Self(bytes))
    }
}

impl OracleKeyPair {
    /// Fresh random key pair from the OS RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Deterministic key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> OraclePublicKey {
        OraclePublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign the canonical serialization of `fields`.
    pub fn sign_fields(&self, fields: &[FieldElement]) -> OracleSignature {
        let message = CanonicalBytes::from_fields(fields);
        OracleSignature(self.signing_key.sign(message.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for OracleKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

macro_rules! hex_newtype_impls {
    ($ty:ident, $label:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let hex = String::deserialize(deserializer)?;
                Self::from_hex(&hex).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({}...)"), &self.to_hex()[..16])
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
}

hex_newtype_impls!(OraclePublicKey, "OraclePublicKey");
hex_newtype_impls!(OracleSignature, "OracleSignature");

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_fixed<const N: usize>(hex: &str) -> Result<[u8; N], String> {
    let hex = hex.trim();
    if hex.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, hex.len()));
    }
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|e| format!("invalid hex at byte {i}: {e}"))?;
    }
    Ok(out)
}
