//! # redact-badge — Badge Issuance
//!
//! A badge is a per-account verification count for one attribute. An item
//! owner discloses that attribute, proves the disclosure twice (once through
//! the map redaction engine, once through the badge recomputation), and
//! presents both proofs with an oracle signature to the [`BadgeIssuer`].
//!
//! - [`config`]: YAML badge configuration.
//! - [`event`]: the oracle-signed [`BadgeEvent`].
//! - [`ledger`]: read and write boundaries to the account ledger, plus
//!   [`MemoryLedger`].
//! - [`issuer`]: cross-checks, the status machine and transition history.

pub mod config;
pub mod event;
pub mod issuer;
pub mod ledger;

pub use config::{BadgeConfig, ConfigError};
pub use event::{revocation_fields, sign_revocation, BadgeEvent};
pub use issuer::{
    BadgeAction, BadgeIssuer, BadgeStatus, BadgeTransitionRecord, IssuanceError, IssuancePayload,
    IssuerKeys, RevocationError, RevocationPayload,
};
pub use ledger::{
    AccountState, LedgerError, LedgerReader, LedgerWriter, MemoryLedger, SubmissionKind,
    TransactionHandle,
};
