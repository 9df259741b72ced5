//! # Ledger Boundary
//!
//! The issuer reads item accounts through [`LedgerReader`] and hands signed
//! payloads to [`LedgerWriter`]. Both are traits so the issuer never knows
//! which chain or database sits behind them.
//!
//! [`MemoryLedger`] is the in-process implementation: a thread-safe map
//! guarded by a `parking_lot::RwLock`, plus a log of submitted payloads.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use redact_core::{AccountAddress, FieldElement, Metadata, Timestamp, TransactionId};

use crate::issuer::{IssuancePayload, RevocationPayload};

/// On-ledger view of one item account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Root pair of the item's full attribute map.
    pub metadata_root: Metadata,
    pub owner: FieldElement,
    pub name: FieldElement,
    /// Badge balance recorded on the ledger.
    pub balance: u64,
}

/// Errors from the ledger layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account {0} not found")]
    AccountNotFound(AccountAddress),

    #[error("ledger rejected submission: {0}")]
    Rejected(String),
}

/// Read access to item accounts.
pub trait LedgerReader: Send + Sync {
    fn account_state(&self, address: &AccountAddress) -> Result<AccountState, LedgerError>;
}

/// What a submitted transaction carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Issuance,
    Revocation,
}

/// Receipt for a payload accepted by the ledger layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    pub id: TransactionId,
    pub kind: SubmissionKind,
    pub address: AccountAddress,
    pub submitted_at: Timestamp,
}

/// Submission of locally validated payloads.
pub trait LedgerWriter: Send + Sync {
    fn submit_issuance(&self, payload: &IssuancePayload) -> Result<TransactionHandle, LedgerError>;

    fn submit_revocation(
        &self,
        payload: &RevocationPayload,
    ) -> Result<TransactionHandle, LedgerError>;
}

impl<T: LedgerReader + ?Sized> LedgerReader for Arc<T> {
    fn account_state(&self, address: &AccountAddress) -> Result<AccountState, LedgerError> {
        (**self).account_state(address)
    }
}

impl<T: LedgerWriter + ?Sized> LedgerWriter for Arc<T> {
    fn submit_issuance(&self, payload: &IssuancePayload) -> Result<TransactionHandle, LedgerError> {
        (**self).submit_issuance(payload)
    }

    fn submit_revocation(
        &self,
        payload: &RevocationPayload,
    ) -> Result<TransactionHandle, LedgerError> {
        (**self).submit_revocation(payload)
    }
}

// ─── In-memory ledger ──────────────────────────────────────────────

/// Thread-safe in-memory ledger.
///
/// Cloning shares the underlying maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    accounts: Arc<RwLock<HashMap<AccountAddress, AccountState>>>,
    submissions: Arc<RwLock<Vec<TransactionHandle>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account.
    pub fn register(&self, address: AccountAddress, state: AccountState) {
        self.accounts.write().insert(address, state);
    }

    pub fn get(&self, address: &AccountAddress) -> Option<AccountState> {
        self.accounts.read().get(address).copied()
    }

    /// Apply a closure to an account under a single write lock.
    pub fn update<F>(&self, address: &AccountAddress, f: F) -> Result<AccountState, LedgerError>
    where
        F: FnOnce(&mut AccountState),
    {
        let mut guard = self.accounts.write();
        let state = guard
            .get_mut(address)
            .ok_or(LedgerError::AccountNotFound(*address))?;
        f(state);
        Ok(*state)
    }

    pub fn set_balance(&self, address: &AccountAddress, balance: u64) -> Result<(), LedgerError> {
        self.update(address, |s| s.balance = balance).map(|_| ())
    }

    /// Every handle issued so far, in submission order.
    pub fn submissions(&self) -> Vec<TransactionHandle> {
        self.submissions.read().clone()
    }

    fn record(&self, kind: SubmissionKind, address: AccountAddress) -> TransactionHandle {
        let handle = TransactionHandle {
            id: TransactionId::new(),
            kind,
            address,
            submitted_at: Timestamp::now(),
        };
        self.submissions.write().push(handle.clone());
        handle
    }
}

impl LedgerReader for MemoryLedger {
    fn account_state(&self, address: &AccountAddress) -> Result<AccountState, LedgerError> {
        self.get(address).ok_or(LedgerError::AccountNotFound(*address))
    }
}

impl LedgerWriter for MemoryLedger {
    fn submit_issuance(&self, payload: &IssuancePayload) -> Result<TransactionHandle, LedgerError> {
        if !self.accounts.read().contains_key(&payload.address) {
            return Err(LedgerError::AccountNotFound(payload.address));
        }
        Ok(self.record(SubmissionKind::Issuance, payload.address))
    }

    fn submit_revocation(
        &self,
        payload: &RevocationPayload,
    ) -> Result<TransactionHandle, LedgerError> {
        if !self.accounts.read().contains_key(&payload.address) {
            return Err(LedgerError::AccountNotFound(payload.address));
        }
        Ok(self.record(SubmissionKind::Revocation, payload.address))
    }
}
