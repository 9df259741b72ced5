//! # Badge Issuer
//!
//! Grants a badge to an item account once a single-attribute disclosure,
//! an independent badge recomputation and an oracle signature all agree.
//!
//! ## States
//!
//! ```text
//! Unissued ──issue──▶ Issued ──revoke──▶ Revoked
//!                      │  ▲                 │
//!                      └──┘ issue           │ issue
//!                      ▲────────────────────┘
//! ```
//!
//! The balance is a verification count. Every successful issuance adds one.
//! Revocation zeroes it from any state.
//!
//! ## Security Invariant
//!
//! `issue` runs every check before touching state. A failed check rejects
//! the whole call with the error naming that check, and the balance stays
//! unchanged. Checks run in a fixed order:
//!
//! 1. event owner, address and name against the ledger account
//! 2. badge key and kind against the configured attribute
//! 3. original root, redacted root and disclosed data across the proofs,
//!    with the redaction proof covering exactly the badge attribute
//! 4. oracle signature over the event fields
//! 5. redaction proof and badge proof, each verified on its own

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use redact_core::{AccountAddress, FieldElement, Timestamp};
use redact_crypto::{OracleKeyPair, OracleSignature};
use redact_zkp::{
    element_hash, BadgeProof, CircuitId, CircuitRegistry, RedactionError, RedactionProof,
    VerificationKey,
};

use crate::config::BadgeConfig;
use crate::event::{revocation_fields, sign_revocation, BadgeEvent};
use crate::ledger::{AccountState, LedgerError, LedgerReader, LedgerWriter, TransactionHandle};

// ─── Status ────────────────────────────────────────────────────────

/// Badge status of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStatus {
    Unissued,
    Issued,
    Revoked,
}

impl std::fmt::Display for BadgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BadgeStatus::Unissued => "UNISSUED",
            BadgeStatus::Issued => "ISSUED",
            BadgeStatus::Revoked => "REVOKED",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeAction {
    Issue,
    Revoke,
}

/// One entry of the append-only transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTransitionRecord {
    pub from_status: BadgeStatus,
    pub to_status: BadgeStatus,
    pub action: BadgeAction,
    /// Balance after the transition.
    pub balance: u64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone)]
struct BadgeAccount {
    status: BadgeStatus,
    balance: u64,
    history: Vec<BadgeTransitionRecord>,
}

impl BadgeAccount {
    /// An account first seen with a ledger balance starts from it.
    fn seeded(balance: u64) -> Self {
        let status = if balance > 0 {
            BadgeStatus::Issued
        } else {
            BadgeStatus::Unissued
        };
        Self {
            status,
            balance,
            history: Vec::new(),
        }
    }

    fn transition(&mut self, to: BadgeStatus, action: BadgeAction, balance: u64) {
        self.history.push(BadgeTransitionRecord {
            from_status: self.status,
            to_status: to,
            action,
            balance,
            timestamp: Timestamp::now(),
        });
        self.status = to;
        self.balance = balance;
    }
}

// ─── Errors ────────────────────────────────────────────────────────

/// Rejection of an issuance, one variant per cross-check.
#[derive(Error, Debug)]
pub enum IssuanceError {
    #[error("event owner {found} does not match account owner {expected}")]
    OwnerMismatch {
        expected: FieldElement,
        found: FieldElement,
    },

    #[error("event address {found} does not match target account {expected}")]
    AddressMismatch {
        expected: AccountAddress,
        found: AccountAddress,
    },

    #[error("event name {found} does not match account name {expected}")]
    NameMismatch {
        expected: FieldElement,
        found: FieldElement,
    },

    #[error("badge proof key {found} is not the verified attribute {expected}")]
    KeyMismatch {
        expected: FieldElement,
        found: FieldElement,
    },

    #[error("event key {found} is not the verified attribute {expected}")]
    EventKeyMismatch {
        expected: FieldElement,
        found: FieldElement,
    },

    #[error("badge proof kind {found} is not the verified kind {expected}")]
    KindMismatch {
        expected: FieldElement,
        found: FieldElement,
    },

    #[error("redaction proof original root does not match the account metadata root")]
    OriginalRootMismatch,

    #[error("badge proof root does not match the redaction proof redacted root")]
    RedactedRootMismatch,

    /// The redaction proof must attest exactly one attribute.
    #[error("redaction proof covers {found} attributes, expected exactly one")]
    RedactionCountMismatch { found: FieldElement },

    /// The attribute the redaction proof attests is not the badge attribute.
    #[error("redaction proof does not attest the badge key and value")]
    RedactionHashMismatch,

    #[error("badge proof data does not match the event data")]
    DataMismatch,

    #[error("oracle signature over the badge event is invalid")]
    SignatureInvalid,

    #[error("redaction proof invalid: {0}")]
    RedactionProofInvalid(#[source] RedactionError),

    #[error("badge proof invalid: {0}")]
    BadgeProofInvalid(#[source] RedactionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Rejection of a revocation.
#[derive(Error, Debug)]
pub enum RevocationError {
    #[error("oracle signature over {0} is invalid")]
    SignatureInvalid(AccountAddress),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ─── Keys and payloads ─────────────────────────────────────────────

/// Verification keys the issuer checks proofs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerKeys {
    pub redaction: VerificationKey,
    pub badge: VerificationKey,
}

impl IssuerKeys {
    pub fn from_registry(registry: &CircuitRegistry) -> Result<Self, RedactionError> {
        Ok(Self {
            redaction: registry.verification_key(&CircuitId::RedactedMap)?.clone(),
            badge: registry.verification_key(&CircuitId::BadgeData)?.clone(),
        })
    }
}

/// Everything an issuance transaction carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePayload {
    pub address: AccountAddress,
    pub event: BadgeEvent,
    pub signature: OracleSignature,
    pub redaction_proof: RedactionProof,
    pub badge_proof: BadgeProof,
}

impl IssuancePayload {
    /// Run every issuance check without changing any state.
    pub fn validate_locally<L: LedgerReader>(
        &self,
        issuer: &BadgeIssuer<L>,
    ) -> Result<(), IssuanceError> {
        issuer.check_issuance(self).map(|_| ())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Everything a revocation transaction carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationPayload {
    pub address: AccountAddress,
    pub signature: OracleSignature,
}

impl RevocationPayload {
    /// Oracle-side constructor.
    pub fn new(address: AccountAddress, oracle: &OracleKeyPair) -> Self {
        Self {
            address,
            signature: sign_revocation(oracle, &address),
        }
    }

    pub fn validate_locally<L: LedgerReader>(
        &self,
        issuer: &BadgeIssuer<L>,
    ) -> Result<(), RevocationError> {
        issuer.check_revocation(&self.address, &self.signature)
    }
}

// ─── Issuer ────────────────────────────────────────────────────────

/// Badge issuer for one configured badge.
pub struct BadgeIssuer<L> {
    config: BadgeConfig,
    ledger: L,
    keys: IssuerKeys,
    accounts: RwLock<HashMap<AccountAddress, BadgeAccount>>,
}

impl<L: LedgerReader> BadgeIssuer<L> {
    pub fn new(config: BadgeConfig, ledger: L, keys: IssuerKeys) -> Self {
        Self {
            config,
            ledger,
            keys,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Issue one badge to `address`. Returns the new balance.
    pub fn issue(
        &self,
        address: &AccountAddress,
        event: &BadgeEvent,
        signature: &OracleSignature,
        redaction_proof: &RedactionProof,
        badge_proof: &BadgeProof,
    ) -> Result<u64, IssuanceError> {
        let account = match self.run_issuance_checks(
            address,
            event,
            signature,
            redaction_proof,
            badge_proof,
        ) {
            Ok(account) => account,
            Err(e) => {
                warn!(address = %address, badge = %self.config.name, error = %e, "badge issuance rejected");
                return Err(e);
            }
        };

        let mut accounts = self.accounts.write();
        let entry = accounts
            .entry(*address)
            .or_insert_with(|| BadgeAccount::seeded(account.balance));
        let balance = entry.balance.saturating_add(1);
        entry.transition(BadgeStatus::Issued, BadgeAction::Issue, balance);

        info!(address = %address, badge = %self.config.name, balance, "badge issued");
        Ok(balance)
    }

    pub fn issue_payload(&self, payload: &IssuancePayload) -> Result<u64, IssuanceError> {
        self.issue(
            &payload.address,
            &payload.event,
            &payload.signature,
            &payload.redaction_proof,
            &payload.badge_proof,
        )
    }

    /// Zero every badge of `address`. Only the oracle signature is checked.
    pub fn revoke(
        &self,
        address: &AccountAddress,
        signature: &OracleSignature,
    ) -> Result<(), RevocationError> {
        if let Err(e) = self.check_revocation(address, signature) {
            warn!(address = %address, badge = %self.config.name, error = %e, "badge revocation rejected");
            return Err(e);
        }

        let mut accounts = self.accounts.write();
        let entry = accounts
            .entry(*address)
            .or_insert_with(|| BadgeAccount::seeded(0));
        let previous = entry.balance;
        entry.transition(BadgeStatus::Revoked, BadgeAction::Revoke, 0);

        info!(address = %address, badge = %self.config.name, previous, "badge revoked");
        Ok(())
    }

    /// Validate locally, then hand the payload to the ledger layer.
    ///
    /// Local state is left alone; the ledger applies the transaction.
    pub fn submit_issuance<W: LedgerWriter>(
        &self,
        writer: &W,
        payload: &IssuancePayload,
    ) -> Result<TransactionHandle, IssuanceError> {
        payload.validate_locally(self)?;
        let handle = writer.submit_issuance(payload)?;
        info!(address = %payload.address, tx = %handle.id, "issuance submitted");
        Ok(handle)
    }

    pub fn submit_revocation<W: LedgerWriter>(
        &self,
        writer: &W,
        payload: &RevocationPayload,
    ) -> Result<TransactionHandle, RevocationError> {
        payload.validate_locally(self)?;
        let handle = writer.submit_revocation(payload)?;
        info!(address = %payload.address, tx = %handle.id, "revocation submitted");
        Ok(handle)
    }

    /// Current balance. Accounts this issuer has not touched report the
    /// ledger balance their first issuance would start from.
    pub fn balance(&self, address: &AccountAddress) -> u64 {
        self.view(address, |a| a.balance)
    }

    pub fn status(&self, address: &AccountAddress) -> BadgeStatus {
        self.view(address, |a| a.status)
    }

    fn view<T>(&self, address: &AccountAddress, read: impl FnOnce(&BadgeAccount) -> T) -> T {
        if let Some(account) = self.accounts.read().get(address) {
            return read(account);
        }
        let balance = self
            .ledger
            .account_state(address)
            .map_or(0, |state| state.balance);
        read(&BadgeAccount::seeded(balance))
    }

    pub fn history(&self, address: &AccountAddress) -> Vec<BadgeTransitionRecord> {
        self.accounts
            .read()
            .get(address)
            .map(|a| a.history.clone())
            .unwrap_or_default()
    }

    fn check_issuance(&self, payload: &IssuancePayload) -> Result<AccountState, IssuanceError> {
        self.run_issuance_checks(
            &payload.address,
            &payload.event,
            &payload.signature,
            &payload.redaction_proof,
            &payload.badge_proof,
        )
    }

    fn run_issuance_checks(
        &self,
        address: &AccountAddress,
        event: &BadgeEvent,
        signature: &OracleSignature,
        redaction_proof: &RedactionProof,
        badge_proof: &BadgeProof,
    ) -> Result<AccountState, IssuanceError> {
        let account = self.ledger.account_state(address)?;
        let redacted = &redaction_proof.public_output;
        let badge = &badge_proof.public_output;

        // 1. event against the account
        if event.owner != account.owner {
            return Err(IssuanceError::OwnerMismatch {
                expected: account.owner,
                found: event.owner,
            });
        }
        if event.address != *address {
            return Err(IssuanceError::AddressMismatch {
                expected: *address,
                found: event.address,
            });
        }
        if event.name != account.name {
            return Err(IssuanceError::NameMismatch {
                expected: account.name,
                found: event.name,
            });
        }

        // 2. badge attribute against config
        let verified_key = self.config.key_field();
        let verified_kind = self.config.kind_field();
        if badge.key != verified_key {
            return Err(IssuanceError::KeyMismatch {
                expected: verified_key,
                found: badge.key,
            });
        }
        if event.key != verified_key {
            return Err(IssuanceError::EventKeyMismatch {
                expected: verified_key,
                found: event.key,
            });
        }
        if badge.data.kind != verified_kind {
            return Err(IssuanceError::KindMismatch {
                expected: verified_kind,
                found: badge.data.kind,
            });
        }

        // 3. roots and data across the proofs
        if redacted.original_root != account.metadata_root {
            return Err(IssuanceError::OriginalRootMismatch);
        }
        if badge.root != redacted.redacted_root {
            return Err(IssuanceError::RedactedRootMismatch);
        }
        // the badge value must be the one copied from the original record
        if redacted.count != FieldElement::ONE {
            return Err(IssuanceError::RedactionCountMismatch {
                found: redacted.count,
            });
        }
        if redacted.hash != element_hash(badge.key, &badge.data) {
            return Err(IssuanceError::RedactionHashMismatch);
        }
        if badge.data != event.data {
            return Err(IssuanceError::DataMismatch);
        }

        // 4. oracle signature
        self.config
            .oracle_public_key
            .verify_fields(&event.to_fields(), signature)
            .map_err(|_| IssuanceError::SignatureInvalid)?;

        // 5. both proofs on their own
        let policy = self.config.proof_policy();
        redaction_proof
            .verify_with_key(&self.keys.redaction, &policy)
            .map_err(IssuanceError::RedactionProofInvalid)?;
        badge_proof
            .verify_with_key(&self.keys.badge, &policy)
            .map_err(IssuanceError::BadgeProofInvalid)?;

        Ok(account)
    }

    fn check_revocation(
        &self,
        address: &AccountAddress,
        signature: &OracleSignature,
    ) -> Result<(), RevocationError> {
        self.config
            .oracle_public_key
            .verify_fields(&revocation_fields(address), signature)
            .map_err(|_| RevocationError::SignatureInvalid(*address))
    }
}
