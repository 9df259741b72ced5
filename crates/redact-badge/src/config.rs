//! Badge configuration.
//!
//! A badge gates one verified attribute: which attribute name (the map
//! key), which kind, and which oracle vouches for it. Loaded from YAML:
//!
//! ```yaml
//! name: twitter-verified
//! verified_key: twitter
//! verified_kind: string
//! oracle_public_key: "3b6a27bc..."
//! policy: development
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use redact_core::FieldElement;
use redact_crypto::{hash_text, OraclePublicKey};
use redact_zkp::{AttributeKind, PolicyMode, ProofPolicy};

/// Configuration of one badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeConfig {
    /// Human-readable badge name.
    pub name: String,
    /// Attribute name whose disclosure earns the badge.
    pub verified_key: String,
    /// Required kind of that attribute.
    pub verified_kind: AttributeKind,
    /// Key of the oracle that signs issuance and revocation.
    pub oracle_public_key: OraclePublicKey,
    /// Whether mock proofs are accepted. Defaults by build profile.
    #[serde(default = "PolicyMode::build_default")]
    pub policy: PolicyMode,
}

impl BadgeConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("badge name must not be empty".into()));
        }
        if self.verified_key.is_empty() {
            return Err(ConfigError::Invalid("verified_key must not be empty".into()));
        }
        Ok(())
    }

    /// Map key of the verified attribute.
    pub fn key_field(&self) -> FieldElement {
        hash_text(&self.verified_key)
    }

    /// Kind tag of the verified attribute.
    pub fn kind_field(&self) -> FieldElement {
        self.verified_kind.field()
    }

    pub fn proof_policy(&self) -> ProofPolicy {
        ProofPolicy::new(self.policy)
    }
}

/// Errors loading a [`BadgeConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid badge YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid badge configuration: {0}")]
    Invalid(String),
}
