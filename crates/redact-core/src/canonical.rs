//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that are hashed
//! into proof statements or signed by the oracle.
//!
//! ## Security Invariant
//!
//! The inner field is private. The only way to construct `CanonicalBytes`
//! is through [`CanonicalBytes::new()`], which rejects floats and serializes
//! with RFC 8785 (JSON Canonicalization Scheme): sorted keys, compact
//! separators, a single deterministic byte sequence per logical value.
//!
//! Proof statements are structs of field elements; since `FieldElement`
//! serializes as a fixed-width hex string, a statement has exactly one
//! canonical encoding, and the prover and a remote verifier hash the same
//! bytes.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;
use crate::field::FieldElement;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are `new()` and `from_fields()`.
/// - No float appears anywhere in the encoded value.
/// - Object keys are sorted, separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float. Returns `CanonicalizationError::SerializationFailed` if JCS
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Canonical encoding of a field sequence: a JSON array of hex strings.
    ///
    /// This is the message format for every oracle signature.
    pub fn from_fields(fields: &[FieldElement]) -> Self {
        let body: Vec<String> = fields.iter().map(|f| format!("\"{}\"", f.to_hex())).collect();
        Self(format!("[{}]", body.join(",")).into_bytes())
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the value tree and reject any number that is not an integer.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;

    #[test]
    fn sorted_keys_compact_separators() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(cb.as_bytes(), br#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn nested_objects_sorted() {
        let data = serde_json::json!({"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn float_rejected() {
        let data = serde_json::json!({"amount": 1.5});
        match CanonicalBytes::new(&data).unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 1.5),
            other => panic!("expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn deeply_nested_float_rejected() {
        let data = serde_json::json!({"a": {"b": [{"c": 3.25}]}});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn metadata_statement_is_deterministic() {
        let m = Metadata::new(FieldElement::from_u64(5), FieldElement::from_u64(6));
        let a = CanonicalBytes::new(&m).unwrap();
        let b = CanonicalBytes::new(&m).unwrap();
        assert_eq!(a, b);
        let s = std::str::from_utf8(a.as_bytes()).unwrap();
        assert!(s.starts_with(r#"{"data":""#));
    }

    #[test]
    fn from_fields_matches_jcs_of_hex_array() {
        let fields = [FieldElement::from_u64(1), FieldElement::from_u64(2)];
        let direct = CanonicalBytes::from_fields(&fields);
        let via_serde = CanonicalBytes::new(&fields.to_vec()).unwrap();
        assert_eq!(direct, via_serde);
    }

    #[test]
    fn from_fields_empty() {
        assert_eq!(CanonicalBytes::from_fields(&[]).as_bytes(), b"[]");
    }

    #[test]
    fn len_and_is_empty() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 7);
    }
}
