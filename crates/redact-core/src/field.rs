//! # Field Elements
//!
//! `FieldElement` is the unit of every commitment in the redaction stack:
//! attribute values, kind tags, map keys, tree roots, accumulator hashes and
//! counts are all elements of the same prime field.
//!
//! ## Modulus
//!
//! The field is the Pallas base field,
//! `p = 0x40000000000000000000000000000000224698fc094cf91b992d30ed00000001`,
//! which is the native field of the ledger family the certificates are
//! verified on. Elements are stored as four little-endian `u64` limbs and
//! are always the canonical representative in `[0, p)`.
//!
//! ## Security Invariant
//!
//! There is no constructor that produces a non-canonical element. Every
//! byte-, bit- or hex-level decoder rejects values `>= p`, so two elements
//! compare equal if and only if they denote the same field value.
//!
//! ## Serde
//!
//! Elements serialize as 64-character big-endian hex strings, which keeps
//! canonical JSON free of numbers wider than 53 bits.

use std::cmp::Ordering;
use std::ops::Add;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldError;

/// Number of bits needed to represent any canonical element.
pub const FIELD_BITS: usize = 255;

/// The field modulus as little-endian limbs.
const MODULUS: [u64; 4] = [
    0x992d_30ed_0000_0001,
    0x2246_98fc_094c_f91b,
    0x0000_0000_0000_0000,
    0x4000_0000_0000_0000,
];

/// An element of the Pallas base field in canonical form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldElement([u64; 4]);

impl FieldElement {
    /// Additive identity.
    pub const ZERO: FieldElement = FieldElement([0, 0, 0, 0]);
    /// Multiplicative identity.
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0]);

    /// Embed a `u64`. Always canonical since `u64::MAX < p`.
    pub const fn from_u64(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }

    /// Return the value as a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0 {
            Some(self.0[0])
        } else {
            None
        }
    }

    /// Build an element from a 32-byte digest by clearing the top two bits.
    ///
    /// The result is below `2^254 < p`, so no reduction is required and the
    /// mapping is uniform over `[0, 2^254)`.
    pub fn from_digest(mut digest: [u8; 32]) -> Self {
        digest[31] &= 0x3f;
        Self(bytes_to_limbs(&digest))
    }

    /// Decode canonical little-endian bytes.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Result<Self, FieldError> {
        let limbs = bytes_to_limbs(bytes);
        if cmp_limbs(&limbs, &MODULUS) != Ordering::Less {
            return Err(FieldError::NonCanonical);
        }
        Ok(Self(limbs))
    }

    /// Encode as canonical little-endian bytes.
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            out[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// Access the little-endian limbs.
    pub fn limbs(&self) -> &[u64; 4] {
        &self.0
    }

    /// Bit `i` of the canonical representative (little-endian order).
    pub fn bit(&self, i: usize) -> bool {
        if i >= 256 {
            return false;
        }
        (self.0[i / 64] >> (i % 64)) & 1 == 1
    }

    /// The lowest `n` bits, little-endian.
    pub fn to_bits_le(&self, n: usize) -> Vec<bool> {
        (0..n).map(|i| self.bit(i)).collect()
    }

    /// Reassemble an element from little-endian bits.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TooManyBits`] for more than 256 bits and
    /// [`FieldError::NonCanonical`] when the value is not below `p`.
    pub fn from_bits_le(bits: &[bool]) -> Result<Self, FieldError> {
        if bits.len() > 256 {
            return Err(FieldError::TooManyBits(bits.len()));
        }
        let mut limbs = [0u64; 4];
        for (i, bit) in bits.iter().enumerate() {
            if *bit {
                limbs[i / 64] |= 1 << (i % 64);
            }
        }
        if cmp_limbs(&limbs, &MODULUS) != Ordering::Less {
            return Err(FieldError::NonCanonical);
        }
        Ok(Self(limbs))
    }

    /// Render as a 64-character big-endian lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().rev().map(|l| format!("{l:016x}")).collect()
    }

    /// Parse a 64-character big-endian hex string.
    pub fn from_hex(hex: &str) -> Result<Self, FieldError> {
        let hex = hex.trim().trim_start_matches("0x").to_lowercase();
        if hex.len() != 64 {
            return Err(FieldError::InvalidHex(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = (3 - i) * 16;
            *limb = u64::from_str_radix(&hex[start..start + 16], 16)
                .map_err(|e| FieldError::InvalidHex(format!("invalid hex: {e}")))?;
        }
        if cmp_limbs(&limbs, &MODULUS) != Ordering::Less {
            return Err(FieldError::NonCanonical);
        }
        Ok(Self(limbs))
    }

    /// Whether this is the additive identity.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    /// Modular addition. Both operands are below `p < 2^255`, so the raw
    /// sum fits in 256 bits and one conditional subtraction suffices.
    fn add(self, rhs: FieldElement) -> FieldElement {
        let mut sum = [0u64; 4];
        let mut carry = false;
        for i in 0..4 {
            let (s1, c1) = self.0[i].overflowing_add(rhs.0[i]);
            let (s2, c2) = s1.overflowing_add(carry as u64);
            sum[i] = s2;
            carry = c1 || c2;
        }
        if carry || cmp_limbs(&sum, &MODULUS) != Ordering::Less {
            sum = sub_limbs(&sum, &MODULUS);
        }
        FieldElement(sum)
    }
}

impl Ord for FieldElement {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_limbs(&self.0, &other.0)
    }
}

impl PartialOrd for FieldElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_u64() {
            Some(v) => write!(f, "FieldElement({v})"),
            None => write!(f, "FieldElement(0x{}...)", &self.to_hex()[..8]),
        }
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Limb arithmetic
// ---------------------------------------------------------------------------

fn bytes_to_limbs(bytes: &[u8; 32]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let mut chunk = [0u8; 8];
        chunk.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
        *limb = u64::from_le_bytes(chunk);
    }
    limbs
}

fn cmp_limbs(a: &[u64; 4], b: &[u64; 4]) -> Ordering {
    for i in (0..4).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let mut out = [0u64; 4];
    let mut borrow = false;
    for i in 0..4 {
        let (d1, b1) = a[i].overflowing_sub(b[i]);
        let (d2, b2) = d1.overflowing_sub(borrow as u64);
        out[i] = d2;
        borrow = b1 || b2;
    }
    out
}
