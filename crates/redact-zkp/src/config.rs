//! Prover configuration.
//!
//! Sizes the aggregation worker pool, selects which tree heights get a
//! compiled circuit, and sets the proof policy. Defaults suit a developer
//! machine; override via environment variables or explicit construction.

use redact_crypto::TreeHeight;

use crate::policy::PolicyMode;

/// Tree heights compiled when `REDACT_TREE_HEIGHTS` is unset.
pub const DEFAULT_TREE_HEIGHTS: [u32; 2] = [8, 20];

/// Configuration for the circuit registry and the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverConfig {
    /// Worker threads in the aggregation pool. At least 1.
    pub workers: usize,
    /// Heights for which a tree-variant circuit is compiled.
    pub tree_heights: Vec<TreeHeight>,
    /// Whether mock proofs are accepted.
    pub policy: PolicyMode,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            tree_heights: DEFAULT_TREE_HEIGHTS
                .iter()
                .filter_map(|h| TreeHeight::new(*h).ok())
                .collect(),
            policy: PolicyMode::build_default(),
        }
    }
}

impl ProverConfig {
    /// Development configuration with the given tree heights.
    pub fn development(tree_heights: &[u32]) -> Result<Self, ConfigError> {
        Ok(Self {
            tree_heights: parse_heights_list(tree_heights)?,
            policy: PolicyMode::Development,
            ..Self::default()
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `REDACT_PROVER_WORKERS` (default: available parallelism)
    /// - `REDACT_TREE_HEIGHTS` comma-separated (default: `8,20`)
    /// - `REDACT_PROOF_POLICY` `production` | `development` (default: by
    ///   build profile)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("REDACT_PROVER_WORKERS") {
            let workers: usize = raw
                .trim()
                .parse()
                .map_err(|_| invalid("REDACT_PROVER_WORKERS", &raw, "not an integer"))?;
            if workers == 0 {
                return Err(invalid("REDACT_PROVER_WORKERS", &raw, "must be at least 1"));
            }
            config.workers = workers;
        }

        if let Some(raw) = lookup("REDACT_TREE_HEIGHTS") {
            let mut heights = Vec::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let h: u32 = part
                    .parse()
                    .map_err(|_| invalid("REDACT_TREE_HEIGHTS", part, "not an integer"))?;
                heights.push(h);
            }
            config.tree_heights = parse_heights_list(&heights)?;
        }

        if let Some(raw) = lookup("REDACT_PROOF_POLICY") {
            config.policy = PolicyMode::parse(&raw).ok_or_else(|| {
                invalid("REDACT_PROOF_POLICY", &raw, "expected production or development")
            })?;
        }

        Ok(config)
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn parse_heights_list(heights: &[u32]) -> Result<Vec<TreeHeight>, ConfigError> {
    let mut out = Vec::with_capacity(heights.len());
    for h in heights {
        let height = TreeHeight::new(*h)
            .map_err(|e| invalid("REDACT_TREE_HEIGHTS", &h.to_string(), &e.to_string()))?;
        if !out.contains(&height) {
            out.push(height);
        }
    }
    out.sort();
    Ok(out)
}

fn invalid(var: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ProverConfig::from_lookup(lookup(&[])).unwrap();
        assert!(cfg.workers >= 1);
        let heights: Vec<u32> = cfg.tree_heights.iter().map(|h| h.get()).collect();
        assert_eq!(heights, vec![8, 20]);
    }

    #[test]
    fn reads_all_variables() {
        let cfg = ProverConfig::from_lookup(lookup(&[
            ("REDACT_PROVER_WORKERS", "3"),
            ("REDACT_TREE_HEIGHTS", "16, 4,16"),
            ("REDACT_PROOF_POLICY", "production"),
        ]))
        .unwrap();
        assert_eq!(cfg.workers, 3);
        let heights: Vec<u32> = cfg.tree_heights.iter().map(|h| h.get()).collect();
        assert_eq!(heights, vec![4, 16]);
        assert_eq!(cfg.policy, PolicyMode::Production);
    }

    #[test]
    fn rejects_zero_workers() {
        let err = ProverConfig::from_lookup(lookup(&[("REDACT_PROVER_WORKERS", "0")])).unwrap_err();
        assert!(err.to_string().contains("REDACT_PROVER_WORKERS"));
    }

    #[test]
    fn rejects_out_of_range_height() {
        assert!(ProverConfig::from_lookup(lookup(&[("REDACT_TREE_HEIGHTS", "8,65")])).is_err());
        assert!(ProverConfig::from_lookup(lookup(&[("REDACT_TREE_HEIGHTS", "eight")])).is_err());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(ProverConfig::from_lookup(lookup(&[("REDACT_PROOF_POLICY", "yolo")])).is_err());
    }

    #[test]
    fn development_constructor() {
        let cfg = ProverConfig::development(&[4]).unwrap();
        assert_eq!(cfg.policy, PolicyMode::Development);
        assert_eq!(cfg.tree_heights.len(), 1);
        assert!(ProverConfig::development(&[1]).is_err());
    }
}
