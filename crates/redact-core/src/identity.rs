//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers that cross the ledger boundary.
//! You cannot pass a raw `FieldElement` where an `AccountAddress` is
//! expected, and you cannot confuse a transaction id with an address.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RedactError;
use crate::field::FieldElement;

/// Address of a ledger account (an item or a badge holder), in field form.
///
/// Addresses enter signed badge events as a single field element, so the
/// field representation is the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountAddress(FieldElement);

impl AccountAddress {
    /// Wrap a field element as an address.
    pub fn new(field: FieldElement) -> Self {
        Self(field)
    }

    /// Parse from the 64-character hex form.
    pub fn from_hex(hex: &str) -> Result<Self, RedactError> {
        Ok(Self(FieldElement::from_hex(hex)?))
    }

    /// The address as a field element.
    pub fn as_field(&self) -> FieldElement {
        self.0
    }
}

impl std::fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "acct:{}", &self.0.to_hex()[48..])
    }
}

/// Identifier of a transaction handed to the ledger layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    /// Generate a new random transaction identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx:{}", self.0)
    }
}
