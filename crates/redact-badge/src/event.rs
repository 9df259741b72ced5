//! # Badge Issuance Event
//!
//! The statement an oracle signs to vouch for one disclosed attribute of one
//! item. Its field serialization is the exact signed message:
//!
//! ```text
//! [address, owner, name, data.data, data.kind, key]
//! ```
//!
//! Revocation signs the single field `[address]`.

use serde::{Deserialize, Serialize};

use redact_core::{AccountAddress, CanonicalBytes, FieldElement, Metadata};
use redact_crypto::{OracleKeyPair, OracleSignature};

/// Oracle-signable binding of an attribute to an item and its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeEvent {
    pub address: AccountAddress,
    pub owner: FieldElement,
    pub name: FieldElement,
    pub data: Metadata,
    pub key: FieldElement,
}

impl BadgeEvent {
    pub fn to_fields(&self) -> [FieldElement; 6] {
        [
            self.address.as_field(),
            self.owner,
            self.name,
            self.data.data,
            self.data.kind,
            self.key,
        ]
    }

    /// Canonical bytes the oracle signs.
    pub fn signing_bytes(&self) -> CanonicalBytes {
        CanonicalBytes::from_fields(&self.to_fields())
    }

    /// Oracle-side helper.
    pub fn sign(&self, oracle: &OracleKeyPair) -> OracleSignature {
        oracle.sign_fields(&self.to_fields())
    }
}

/// Fields signed to revoke every badge of `address`.
pub fn revocation_fields(address: &AccountAddress) -> [FieldElement; 1] {
    [address.as_field()]
}

/// Oracle-side helper for revocation.
pub fn sign_revocation(oracle: &OracleKeyPair, address: &AccountAddress) -> OracleSignature {
    oracle.sign_fields(&revocation_fields(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use redact_crypto::hash_text;

    fn event() -> BadgeEvent {
        BadgeEvent {
            address: AccountAddress::new(FieldElement::from_u64(1)),
            owner: FieldElement::from_u64(2),
            name: hash_text("item"),
            data: Metadata::new(hash_text("@x"), hash_text("string")),
            key: hash_text("twitter"),
        }
    }

    #[test]
    fn field_order() {
        let e = event();
        let f = e.to_fields();
        assert_eq!(f[0], e.address.as_field());
        assert_eq!(f[1], e.owner);
        assert_eq!(f[2], e.name);
        assert_eq!(f[3], e.data.data);
        assert_eq!(f[4], e.data.kind);
        assert_eq!(f[5], e.key);
        assert_eq!(e.signing_bytes(), CanonicalBytes::from_fields(&f));
    }

    #[test]
    fn signature_binds_every_field() {
        let oracle = OracleKeyPair::from_seed(&[8u8; 32]);
        let sig = event().sign(&oracle);
        let pk = oracle.public_key();
        assert!(pk.verify_fields(&event().to_fields(), &sig).is_ok());

        let mut other = event();
        other.data.kind = hash_text("number");
        assert!(pk.verify_fields(&other.to_fields(), &sig).is_err());
    }

    #[test]
    fn revocation_signature_differs_from_event_signature() {
        let oracle = OracleKeyPair::from_seed(&[8u8; 32]);
        let e = event();
        let revoke = sign_revocation(&oracle, &e.address);
        assert_ne!(revoke, e.sign(&oracle));
        assert!(oracle
            .public_key()
            .verify_fields(&revocation_fields(&e.address), &revoke)
            .is_ok());
    }
}
